//! In-memory ADXL345 register file used when no sensor hardware is attached.

use std::f64::consts::PI;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::drivers::adxl345::{
    DEVICE_ID, FIFO_DEPTH, REG_BW_RATE, REG_DATAX0, REG_DATA_FORMAT, REG_DEVICE_ID, REG_FIFO_CTL,
    REG_FIFO_STATUS, REG_OFSX, REG_OFSY, REG_OFSZ,
};

use super::{RegisterTransport, TransportError};

/// Number of addressable registers
const REGISTER_COUNT: usize = 0x40;
/// One g in full resolution counts
const ONE_G: i16 = 256;
/// Full resolution counts per offset register LSB (15.6 mg)
const OFFSET_COUNTS: i32 = 4;

/// Motion applied to the simulated device
#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    /// Device at rest producing the given full resolution counts
    Resting { x: i16, y: i16, z: i16 },
    /// X and Y trace a sine/cosine pair with the given period (in samples),
    /// Z stays at 1g
    Periodic { period: u32, amplitude: i16 },
}

impl Default for Motion {
    fn default() -> Self {
        Motion::Periodic {
            period: 100,
            amplitude: ONE_G / 2,
        }
    }
}

/// [SimulatedAdxl345] behaves like the accelerometer's register map. Every
/// burst read starting at DATAX0 latches a new reading, the offset
/// registers are added to each reading and the data format register
/// selects between full and 10-bit resolution.
pub struct SimulatedAdxl345 {
    registers: [u8; REGISTER_COUNT],
    motion: Motion,
    step: u64,
    noise: i16,
    rng: StdRng,
    fifo_entries: u8,
    transfers: u64,
    fail_after: Option<u64>,
}

impl SimulatedAdxl345 {
    pub fn new(motion: Motion) -> Self {
        let mut registers = [0; REGISTER_COUNT];
        registers[REG_DEVICE_ID as usize] = DEVICE_ID;
        registers[REG_BW_RATE as usize] = 0x0A;
        Self {
            registers,
            motion,
            step: 0,
            noise: 0,
            rng: StdRng::seed_from_u64(0),
            fifo_entries: 0,
            transfers: 0,
            fail_after: None,
        }
    }

    /// Add uniformly distributed noise of +/- `noise` counts to every axis
    pub fn with_noise(mut self, noise: i16, seed: u64) -> Self {
        self.noise = noise.abs();
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Fail every bus transfer after the given number of successful ones
    #[cfg(test)]
    pub fn with_failure_after(mut self, transfers: u64) -> Self {
        self.fail_after = Some(transfers);
        self
    }

    /// Returns the current value of the given register
    #[cfg(test)]
    pub fn register(&self, address: u8) -> u8 {
        self.registers[address as usize & (REGISTER_COUNT - 1)]
    }

    fn check_bus(&mut self) -> Result<(), TransportError> {
        if let Some(limit) = self.fail_after {
            if self.transfers >= limit {
                return Err(TransportError::Bus("simulated bus fault".into()));
            }
        }
        self.transfers += 1;
        Ok(())
    }

    fn check_range(address: u8, count: usize) -> Result<(), TransportError> {
        let end = address as usize + count;
        if end > REGISTER_COUNT {
            return Err(TransportError::ShortRead {
                address,
                expected: count,
                actual: REGISTER_COUNT.saturating_sub(address as usize),
            });
        }
        Ok(())
    }

    /// Produce the next reading and store it in the data registers
    fn latch(&mut self) {
        let (x, y, z) = match self.motion {
            Motion::Resting { x, y, z } => (x as i32, y as i32, z as i32),
            Motion::Periodic { period, amplitude } => {
                let period = period.max(1);
                let phase = (self.step % period as u64) as f64 / period as f64;
                let angle = 2.0 * PI * phase;
                let x = (amplitude as f64 * angle.sin()).round() as i32;
                let y = (amplitude as f64 * angle.cos()).round() as i32;
                (x, y, ONE_G as i32)
            }
        };
        self.step += 1;
        if self.fifo_entries > 0 {
            self.fifo_entries -= 1;
        }

        let format = self.registers[REG_DATA_FORMAT as usize];
        let full_resolution = format & 0x08 != 0;
        let range = (format & 0x03) as u32;

        let offsets = [REG_OFSX, REG_OFSY, REG_OFSZ];
        for (i, (value, offset)) in [x, y, z].into_iter().zip(offsets).enumerate() {
            let offset = self.registers[offset as usize] as i8 as i32 * OFFSET_COUNTS;
            let noise = if self.noise > 0 {
                self.rng.random_range(-self.noise..=self.noise) as i32
            } else {
                0
            };
            let mut counts = value + offset + noise;
            if !full_resolution {
                counts >>= range;
            }
            let counts = counts.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
            let [low, high] = counts.to_le_bytes();
            let address = REG_DATAX0 as usize + i * 2;
            self.registers[address] = low;
            self.registers[address + 1] = high;
        }
    }
}

impl Default for SimulatedAdxl345 {
    fn default() -> Self {
        Self::new(Motion::default())
    }
}

impl RegisterTransport for SimulatedAdxl345 {
    fn read(&mut self, address: u8) -> Result<u8, TransportError> {
        self.check_bus()?;
        Self::check_range(address, 1)?;
        if address == REG_FIFO_STATUS {
            return Ok(self.fifo_entries);
        }
        if address == REG_DATAX0 {
            self.latch();
        }
        Ok(self.registers[address as usize])
    }

    fn read_many(&mut self, address: u8, count: usize) -> Result<Vec<u8>, TransportError> {
        self.check_bus()?;
        Self::check_range(address, count)?;
        if address == REG_DATAX0 {
            self.latch();
        }
        let start = address as usize;
        Ok(self.registers[start..start + count].to_vec())
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), TransportError> {
        self.check_bus()?;
        Self::check_range(address, 1)?;
        if address == REG_DEVICE_ID {
            // Read-only
            return Ok(());
        }
        if address == REG_FIFO_CTL {
            // Any mode other than bypass starts collecting samples
            self.fifo_entries = if value >> 6 == 0 { 0 } else { FIFO_DEPTH };
        }
        self.registers[address as usize] = value;
        Ok(())
    }
}
