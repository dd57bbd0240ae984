use embedded_hal::i2c::{Error as _, I2c, SevenBitAddress};
use linux_embedded_hal::I2cdev;

use super::{RegisterTransport, TransportError};

/// Register access to a single device on an I2C bus
pub struct I2cTransport<I> {
    bus: I,
    address: SevenBitAddress,
}

impl<I: I2c> I2cTransport<I> {
    pub fn new(bus: I, address: SevenBitAddress) -> Self {
        Self { bus, address }
    }
}

impl I2cTransport<I2cdev> {
    /// Open the given Linux i2c-dev node (e.g. "/dev/i2c-1") and address the
    /// device at the given 7-bit address.
    pub fn open(path: &str, address: SevenBitAddress) -> Result<Self, TransportError> {
        log::debug!("Opening I2C device {path} at address {address:#04x}");
        let bus = I2cdev::new(path).map_err(|e| TransportError::Open {
            path: path.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self::new(bus, address))
    }
}

impl<I: I2c + Send> RegisterTransport for I2cTransport<I> {
    fn read(&mut self, address: u8) -> Result<u8, TransportError> {
        let mut buf = [0; 1];
        self.bus
            .write_read(self.address, &[address], &mut buf)
            .map_err(|e| TransportError::Bus(format!("{:?}", e.kind())))?;
        Ok(buf[0])
    }

    fn read_many(&mut self, address: u8, count: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0; count];
        self.bus
            .write_read(self.address, &[address], &mut buf)
            .map_err(|e| TransportError::Bus(format!("{:?}", e.kind())))?;
        Ok(buf)
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), TransportError> {
        log::trace!("I2C {:#04x}: write {value:#04x} to {address:#04x}", self.address);
        self.bus
            .write(self.address, &[address, value])
            .map_err(|e| TransportError::Bus(format!("{:?}", e.kind())))
    }
}
