pub mod adxl345;
pub mod hmc5883l;
pub mod itg3200;
pub mod transport;

use packed_struct::PackingError;
use thiserror::Error;

use self::transport::TransportError;

/// Represents all possible errors raised by a sensor driver
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("Could not determine orientation. One axis should be aligned with gravity: ({x}, {y}, {z})")]
    AmbiguousOrientation { x: f64, y: f64, z: f64 },
    #[error("Offset of {value}g does not fit in an 8-bit offset register")]
    OverflowOnEncode { value: f64 },
    #[error("Unable to pack register: {0}")]
    Packing(#[from] PackingError),
    #[error("Unexpected device id {found:#04x}, expected {expected:#04x}")]
    UnexpectedDeviceId { expected: u8, found: u8 },
}

/// AxisData represents one (x, y, z) reading from a sensor in the sensor's
/// natural units (g for the accelerometer, degrees per second for the
/// gyroscope, gauss for the compass).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AxisData {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
