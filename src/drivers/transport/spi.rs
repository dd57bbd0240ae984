use embedded_hal::spi::{Error as _, Operation, SpiDevice};
use linux_embedded_hal::{
    spidev::{SpiModeFlags, SpidevOptions},
    SpidevDevice,
};

use super::{RegisterTransport, TransportError};

/// Address bit marking a register read
const READ_MASK: u8 = 0x80;
/// Address bit requesting an auto-incrementing burst transfer
const MULTIREAD_MASK: u8 = 0x40;
/// Register addresses are 6 bits wide
const ADDRESS_MASK: u8 = 0x3F;
/// Highest clock the ADXL345 supports in 4-wire mode
const MAX_SPEED_HZ: u32 = 5_000_000;

/// Register access to a device over 4-wire SPI
pub struct SpiTransport<S> {
    device: S,
}

impl<S: SpiDevice> SpiTransport<S> {
    pub fn new(device: S) -> Self {
        Self { device }
    }
}

impl SpiTransport<SpidevDevice> {
    /// Open the given spidev node (e.g. "/dev/spidev0.0") in SPI mode 3
    pub fn open(path: &str) -> Result<Self, TransportError> {
        log::debug!("Opening SPI device {path}");
        let open_error = |reason: String| TransportError::Open {
            path: path.to_string(),
            reason,
        };
        let mut device = SpidevDevice::open(path).map_err(|e| open_error(format!("{e:?}")))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(MAX_SPEED_HZ)
            .mode(SpiModeFlags::SPI_MODE_3)
            .build();
        device
            .configure(&options)
            .map_err(|e| open_error(e.to_string()))?;
        Ok(Self::new(device))
    }
}

impl<S: SpiDevice + Send> RegisterTransport for SpiTransport<S> {
    fn read(&mut self, address: u8) -> Result<u8, TransportError> {
        let mut buf = [0; 1];
        let command = [(address & ADDRESS_MASK) | READ_MASK];
        self.device
            .transaction(&mut [Operation::Write(&command), Operation::Read(&mut buf)])
            .map_err(|e| TransportError::Bus(format!("{:?}", e.kind())))?;
        Ok(buf[0])
    }

    fn read_many(&mut self, address: u8, count: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0; count];
        let command = [(address & ADDRESS_MASK) | READ_MASK | MULTIREAD_MASK];
        self.device
            .transaction(&mut [Operation::Write(&command), Operation::Read(&mut buf)])
            .map_err(|e| TransportError::Bus(format!("{:?}", e.kind())))?;
        Ok(buf)
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), TransportError> {
        log::trace!("SPI: write {value:#04x} to {address:#04x}");
        self.device
            .write(&[address & ADDRESS_MASK, value])
            .map_err(|e| TransportError::Bus(format!("{:?}", e.kind())))
    }
}
