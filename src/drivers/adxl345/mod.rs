pub mod driver;
pub mod registers;

// Register map
pub const REG_DEVICE_ID: u8 = 0x00;
pub const REG_OFSX: u8 = 0x1E;
pub const REG_OFSY: u8 = 0x1F;
pub const REG_OFSZ: u8 = 0x20;
pub const REG_BW_RATE: u8 = 0x2C;
pub const REG_POWER_CTL: u8 = 0x2D;
pub const REG_DATA_FORMAT: u8 = 0x31;
pub const REG_DATAX0: u8 = 0x32;
pub const REG_FIFO_CTL: u8 = 0x38;
pub const REG_FIFO_STATUS: u8 = 0x39;

/// Fixed value of the device id register
pub const DEVICE_ID: u8 = 0xE5;

// I2C addresses selected by the SDO/ALT ADDRESS pin
pub const STD_ADDRESS: u8 = 0x1D;
pub const ALT_ADDRESS: u8 = 0x53;

/// Full resolution scale factor (0x100 LSB/g ~= 3.9 mg/LSB)
pub const SCALE_FACTOR: f64 = 1.0 / 256.0;

/// Bytes in one X/Y/Z data burst
pub const SAMPLE_SIZE: usize = 6;

/// Number of samples the hardware FIFO holds
pub const FIFO_DEPTH: u8 = 32;

/// Tolerance, in g, used when deciding which axis is aligned with gravity
pub const GRAVITY_TOLERANCE: f64 = 0.1;
