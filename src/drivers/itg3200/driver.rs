use crate::drivers::{transport::RegisterTransport, AxisData, DriverError};

use super::{
    FS_SEL, MAX_LOW_PASS_FILTER, REG_DLPF_FS, REG_GYRO_XOUT_H, REG_SMPLRT_DIV, REG_WHO_AM_I,
    SENSITIVITY,
};

/// Driver for the ITG3200 gyroscope. Data is polled; interrupts are not used.
pub struct Driver<T> {
    transport: T,
}

impl<T: RegisterTransport> Driver<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Read the WHO_AM_I register (the device's I2C address bits)
    pub fn device_id(&mut self) -> Result<u8, DriverError> {
        Ok(self.transport.read(REG_WHO_AM_I)? & 0x7E)
    }

    /// Set the low pass filter and the internal sample rate divider.
    ///
    ///   lpf  bandwidth  internal rate
    ///     0     256Hz         8kHz
    ///     1     188Hz         1kHz
    ///     2      98Hz         1kHz
    ///     3      42Hz         1kHz
    ///     4      20Hz         1kHz
    ///     5      10Hz         1kHz
    ///     6       5Hz         1kHz
    ///
    /// The output rate is the internal rate divided by `divider` (1..=256).
    pub fn configure_sample_rate(&mut self, lpf: u8, divider: u16) -> Result<(), DriverError> {
        if lpf > MAX_LOW_PASS_FILTER {
            return Err(DriverError::InvalidArgument(format!(
                "invalid low pass filter code [{lpf}] expected 0-6"
            )));
        }
        if !(1..=256).contains(&divider) {
            return Err(DriverError::InvalidArgument(format!(
                "invalid sample rate divider [{divider}] expected 1-256"
            )));
        }
        self.transport.write(REG_SMPLRT_DIV, (divider - 1) as u8)?;
        self.transport.write(REG_DLPF_FS, FS_SEL | lpf)?;
        Ok(())
    }

    /// Read the angular rate of each axis in degrees per second
    pub fn read_sample(&mut self) -> Result<AxisData, DriverError> {
        let bytes = self.transport.read_exact(REG_GYRO_XOUT_H, 6)?;
        let axis = |i: usize| i16::from_be_bytes([bytes[i], bytes[i + 1]]) as f64 / SENSITIVITY;
        Ok(AxisData {
            x: axis(0),
            y: axis(2),
            z: axis(4),
        })
    }
}
