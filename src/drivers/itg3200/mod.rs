pub mod driver;

// Register map
pub const REG_WHO_AM_I: u8 = 0x00;
pub const REG_SMPLRT_DIV: u8 = 0x15;
pub const REG_DLPF_FS: u8 = 0x16;
pub const REG_GYRO_XOUT_H: u8 = 0x1D;

/// Default I2C address (AD0 pulled high)
pub const ADDRESS: u8 = 0x68;

/// FS_SEL must be 0b11 for proper operation
pub const FS_SEL: u8 = 0x18;

/// Highest low pass filter code (5 Hz)
pub const MAX_LOW_PASS_FILTER: u8 = 0x06;

/// Sensitivity in LSB per degree per second
pub const SENSITIVITY: f64 = 14.375;
