pub mod driver;

// Register map
pub const REG_CONFIG_A: u8 = 0x00;
pub const REG_CONFIG_B: u8 = 0x01;
pub const REG_MODE: u8 = 0x02;
pub const REG_DATA_X_MSB: u8 = 0x03;
pub const REG_ID_A: u8 = 0x0A;

/// 7-bit I2C address
pub const ADDRESS: u8 = 0x1E;

/// Identification registers A, B and C read "H43"
pub const DEVICE_ID: [u8; 3] = *b"H43";

/// 8 samples averaged, 15 Hz output, normal measurement
pub const CONFIG_A_DEFAULT: u8 = 0x70;
/// Gain of 1090 LSB/gauss (+/- 1.3 Ga)
pub const CONFIG_B_DEFAULT: u8 = 0x20;
pub const MODE_CONTINUOUS: u8 = 0x00;
pub const MODE_IDLE: u8 = 0x03;

/// LSB per gauss at the default gain
pub const GAIN: f64 = 1090.0;

/// Value reported by an axis whose ADC over/underflowed
pub const OVERFLOW: i16 = -4096;
