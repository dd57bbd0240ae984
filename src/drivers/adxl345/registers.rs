use packed_struct::prelude::*;

use crate::drivers::DriverError;

/// Measurement range selected in the DATA_FORMAT register
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum Range {
    #[default]
    G2 = 0x00,
    G4 = 0x01,
    G8 = 0x02,
    G16 = 0x03,
}

impl Range {
    /// Returns the range for the given +/- g value (2, 4, 8 or 16)
    pub fn from_g(range_g: u8) -> Result<Self, DriverError> {
        match range_g {
            2 => Ok(Range::G2),
            4 => Ok(Range::G4),
            8 => Ok(Range::G8),
            16 => Ok(Range::G16),
            _ => Err(DriverError::InvalidArgument(format!(
                "invalid range [{range_g}] expected one of [2, 4, 8, 16]"
            ))),
        }
    }

    /// Returns the +/- g value of this range
    pub fn g(&self) -> u8 {
        2 << self.to_primitive()
    }
}

/// Output data rates supported by the device. The discriminant is the
/// 4-bit rate code written to BW_RATE; each step halves the rate.
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum DataRate {
    Hz0_10 = 0b0000,
    Hz0_20 = 0b0001,
    Hz0_39 = 0b0010,
    Hz0_78 = 0b0011,
    Hz1_56 = 0b0100,
    Hz3_13 = 0b0101,
    Hz6_25 = 0b0110,
    Hz12_5 = 0b0111,
    Hz25 = 0b1000,
    Hz50 = 0b1001,
    #[default]
    Hz100 = 0b1010,
    Hz200 = 0b1011,
    Hz400 = 0b1100,
    Hz800 = 0b1101,
    Hz1600 = 0b1110,
    Hz3200 = 0b1111,
}

impl DataRate {
    /// All rates from slowest to fastest
    pub const ALL: [DataRate; 16] = [
        DataRate::Hz0_10,
        DataRate::Hz0_20,
        DataRate::Hz0_39,
        DataRate::Hz0_78,
        DataRate::Hz1_56,
        DataRate::Hz3_13,
        DataRate::Hz6_25,
        DataRate::Hz12_5,
        DataRate::Hz25,
        DataRate::Hz50,
        DataRate::Hz100,
        DataRate::Hz200,
        DataRate::Hz400,
        DataRate::Hz800,
        DataRate::Hz1600,
        DataRate::Hz3200,
    ];

    /// Returns the exact output data rate in Hz (3200 / 2^(15 - code))
    pub fn hz(&self) -> f64 {
        3200.0 / (1u32 << (15 - self.to_primitive())) as f64
    }

    /// Returns the largest supported rate that does not exceed `hz`. Requests
    /// below the slowest rate yield the slowest rate (25/256 Hz).
    pub fn from_hz(hz: f64) -> Result<Self, DriverError> {
        if hz.is_nan() {
            return Err(DriverError::InvalidArgument(
                "data rate must be a number".into(),
            ));
        }
        let rate = DataRate::ALL
            .iter()
            .rev()
            .find(|rate| rate.hz() <= hz)
            .copied()
            .unwrap_or(DataRate::Hz0_10);
        Ok(rate)
    }
}

/// Operating mode of the 32 sample FIFO
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum FifoMode {
    #[default]
    Bypass = 0x00,
    Fifo = 0x01,
    Stream = 0x02,
    Trigger = 0x03,
}

/// BW_RATE (0x2C)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "1")]
pub struct BandwidthRate {
    #[packed_field(bits = "3")]
    pub low_power: bool,
    #[packed_field(bits = "4..=7", ty = "enum")]
    pub rate: DataRate,
}

/// POWER_CTL (0x2D)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "1")]
pub struct PowerControl {
    #[packed_field(bits = "2")]
    pub link: bool,
    #[packed_field(bits = "3")]
    pub auto_sleep: bool,
    #[packed_field(bits = "4")]
    pub measure: bool,
    #[packed_field(bits = "5")]
    pub sleep: bool,
    /// Reading frequency while asleep: 8, 4, 2 or 1 Hz
    #[packed_field(bits = "6..=7")]
    pub wake_up: Integer<u8, packed_bits::Bits<2>>,
}

/// DATA_FORMAT (0x31)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "1")]
pub struct DataFormat {
    #[packed_field(bits = "0")]
    pub self_test: bool,
    #[packed_field(bits = "1")]
    pub spi_3wire: bool,
    #[packed_field(bits = "2")]
    pub int_invert: bool,
    #[packed_field(bits = "4")]
    pub full_resolution: bool,
    #[packed_field(bits = "5")]
    pub justify: bool,
    #[packed_field(bits = "6..=7", ty = "enum")]
    pub range: Range,
}

/// FIFO_CTL (0x38)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "1")]
pub struct FifoControl {
    #[packed_field(bits = "0..=1", ty = "enum")]
    pub mode: FifoMode,
    /// Route the trigger event to INT2 instead of INT1
    #[packed_field(bits = "2")]
    pub trigger: bool,
    /// Watermark / trigger sample count
    #[packed_field(bits = "3..=7")]
    pub samples: Integer<u8, packed_bits::Bits<5>>,
}
