use crate::drivers::{transport::RegisterTransport, AxisData, DriverError};

use super::{
    CONFIG_A_DEFAULT, CONFIG_B_DEFAULT, DEVICE_ID, GAIN, MODE_CONTINUOUS, MODE_IDLE, OVERFLOW,
    REG_CONFIG_A, REG_CONFIG_B, REG_DATA_X_MSB, REG_ID_A, REG_MODE,
};

/// Driver for the HMC5883L three axis compass
pub struct Driver<T> {
    transport: T,
}

impl<T: RegisterTransport> Driver<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Read the three identification registers
    pub fn device_id(&mut self) -> Result<[u8; 3], DriverError> {
        let bytes = self.transport.read_exact(REG_ID_A, 3)?;
        Ok([bytes[0], bytes[1], bytes[2]])
    }

    /// Returns true if the identification registers read "H43"
    pub fn is_present(&mut self) -> Result<bool, DriverError> {
        Ok(self.device_id()? == DEVICE_ID)
    }

    /// Apply the default averaging, rate and gain and start continuous
    /// measurement
    pub fn start(&mut self) -> Result<(), DriverError> {
        self.transport.write(REG_CONFIG_A, CONFIG_A_DEFAULT)?;
        self.transport.write(REG_CONFIG_B, CONFIG_B_DEFAULT)?;
        self.transport.write(REG_MODE, MODE_CONTINUOUS)?;
        Ok(())
    }

    /// Put the device in idle mode
    pub fn stop(&mut self) -> Result<(), DriverError> {
        Ok(self.transport.write(REG_MODE, MODE_IDLE)?)
    }

    /// Read the magnetic field of each axis in gauss. Saturated axes read
    /// as negative infinity.
    pub fn read_sample(&mut self) -> Result<AxisData, DriverError> {
        // The data registers are ordered X, Z, Y
        let bytes = self.transport.read_exact(REG_DATA_X_MSB, 6)?;
        let axis = |i: usize| {
            let raw = i16::from_be_bytes([bytes[i], bytes[i + 1]]);
            if raw == OVERFLOW {
                return f64::NEG_INFINITY;
            }
            raw as f64 / GAIN
        };
        Ok(AxisData {
            x: axis(0),
            y: axis(4),
            z: axis(2),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::drivers::transport::TransportError;

    use super::*;

    struct Registers([u8; 13]);

    impl RegisterTransport for Registers {
        fn read(&mut self, address: u8) -> Result<u8, TransportError> {
            Ok(self.0[address as usize])
        }

        fn read_many(&mut self, address: u8, count: usize) -> Result<Vec<u8>, TransportError> {
            let start = address as usize;
            Ok(self.0[start..start + count].to_vec())
        }

        fn write(&mut self, address: u8, value: u8) -> Result<(), TransportError> {
            self.0[address as usize] = value;
            Ok(())
        }
    }

    #[test]
    fn test_start_and_identify() {
        let mut registers = Registers([0; 13]);
        registers.0[10..13].copy_from_slice(b"H43");
        let mut driver = Driver::new(registers);
        assert!(driver.is_present().unwrap());
        driver.start().unwrap();
        assert_eq!(&driver.transport.0[0..3], &[0x70, 0x20, 0x00]);
    }

    #[test]
    fn test_read_sample_axis_order() {
        let mut registers = Registers([0; 13]);
        // X = 1090, Z = -545, Y = overflow
        registers.0[3..9].copy_from_slice(&[0x04, 0x42, 0xFD, 0xDF, 0xF0, 0x00]);
        let mut driver = Driver::new(registers);
        let sample = driver.read_sample().unwrap();
        assert_eq!(sample.x, 1.0);
        assert_eq!(sample.z, -0.5);
        assert_eq!(sample.y, f64::NEG_INFINITY);
    }

    /// Bus that only ever returns two bytes
    struct TruncatingBus;

    impl RegisterTransport for TruncatingBus {
        fn read(&mut self, _address: u8) -> Result<u8, TransportError> {
            Ok(0)
        }

        fn read_many(&mut self, _address: u8, count: usize) -> Result<Vec<u8>, TransportError> {
            Ok(vec![0; count.min(2)])
        }

        fn write(&mut self, _address: u8, _value: u8) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[test]
    fn test_short_read_is_an_error() {
        let mut driver = Driver::new(TruncatingBus);
        assert!(matches!(
            driver.read_sample(),
            Err(DriverError::Transport(TransportError::ShortRead {
                address: REG_DATA_X_MSB,
                expected: 6,
                actual: 2,
            }))
        ));
        assert!(matches!(
            driver.device_id(),
            Err(DriverError::Transport(TransportError::ShortRead {
                address: REG_ID_A,
                expected: 3,
                actual: 2,
            }))
        ));
    }
}
