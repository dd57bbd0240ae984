pub mod i2c;
pub mod simulated;
pub mod spi;

use thiserror::Error;

/// Represents all possible errors produced by a register transport
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Bus transfer failed: {0}")]
    Bus(String),
    #[error("Short read from register {address:#04x}: expected {expected} bytes, got {actual}")]
    ShortRead {
        address: u8,
        expected: usize,
        actual: usize,
    },
    #[error("Unable to open bus device {path}: {reason}")]
    Open { path: String, reason: String },
}

/// A [RegisterTransport] moves single register values to and from a device
/// on a physical bus. Every call is one synchronous bus transaction with no
/// retry; a failed transfer is returned to the caller unchanged.
pub trait RegisterTransport: Send {
    /// Read a single register
    fn read(&mut self, address: u8) -> Result<u8, TransportError>;

    /// Read `count` contiguous registers starting at `address`
    fn read_many(&mut self, address: u8, count: usize) -> Result<Vec<u8>, TransportError>;

    /// Write a single register
    fn write(&mut self, address: u8, value: u8) -> Result<(), TransportError>;

    /// Read exactly `count` contiguous registers. A transport that returns
    /// fewer bytes produces [TransportError::ShortRead].
    fn read_exact(&mut self, address: u8, count: usize) -> Result<Vec<u8>, TransportError> {
        let bytes = self.read_many(address, count)?;
        if bytes.len() < count {
            return Err(TransportError::ShortRead {
                address,
                expected: count,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for Box<T> {
    fn read(&mut self, address: u8) -> Result<u8, TransportError> {
        (**self).read(address)
    }

    fn read_many(&mut self, address: u8, count: usize) -> Result<Vec<u8>, TransportError> {
        (**self).read_many(address, count)
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), TransportError> {
        (**self).write(address, value)
    }
}
