use packed_struct::PackedStruct;

use crate::drivers::{transport::RegisterTransport, AxisData, DriverError};

use super::{
    registers::{BandwidthRate, DataFormat, DataRate, FifoControl, FifoMode, PowerControl, Range},
    DEVICE_ID, GRAVITY_TOLERANCE, REG_BW_RATE, REG_DATAX0, REG_DATA_FORMAT, REG_DEVICE_ID,
    REG_FIFO_CTL, REG_FIFO_STATUS, REG_OFSX, REG_OFSY, REG_OFSZ, REG_POWER_CTL, SAMPLE_SIZE,
    SCALE_FACTOR,
};

/// Accelerometer settings owned by the [Driver]. These only change through
/// the driver's configuration methods, which push them to the device
/// immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Configuration {
    pub range: Range,
    pub full_resolution: bool,
    pub rate: DataRate,
    pub low_power: bool,
    /// Power control bits other than "measure"
    pub power: PowerControl,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            range: Range::G2,
            full_resolution: true,
            rate: DataRate::Hz100,
            low_power: false,
            power: PowerControl::default(),
        }
    }
}

/// Register level driver for the ADXL345 accelerometer. Every method is a
/// direct, synchronous register transaction on the underlying transport.
pub struct Driver<T> {
    transport: T,
    config: Configuration,
}

impl<T: RegisterTransport> Driver<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: Configuration::default(),
        }
    }

    /// Returns the current configuration
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Returns a reference to the underlying transport
    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Read the fixed device id register
    pub fn device_id(&mut self) -> Result<u8, DriverError> {
        Ok(self.transport.read(REG_DEVICE_ID)?)
    }

    /// Read the device id and fail if the device is not an ADXL345
    pub fn verify_device_id(&mut self) -> Result<(), DriverError> {
        let found = self.device_id()?;
        if found != DEVICE_ID {
            return Err(DriverError::UnexpectedDeviceId {
                expected: DEVICE_ID,
                found,
            });
        }
        Ok(())
    }

    /// Set the g range (2, 4, 8 or 16) and the resolution. Full resolution
    /// keeps a constant 3.9 mg/LSB scale; otherwise the output is 10 bits
    /// wide and the scale grows with the range.
    pub fn configure_range(
        &mut self,
        range_g: u8,
        full_resolution: bool,
    ) -> Result<(), DriverError> {
        let range = Range::from_g(range_g)?;
        self.config.range = range;
        self.config.full_resolution = full_resolution;
        self.send_data_format()
    }

    /// Select the largest supported output data rate that does not exceed
    /// `target_hz` and return the rate that was applied.
    pub fn configure_rate(&mut self, target_hz: f64, low_power: bool) -> Result<f64, DriverError> {
        let rate = DataRate::from_hz(target_hz)?;
        let value = BandwidthRate { low_power, rate };
        self.write_register(REG_BW_RATE, value.pack()?[0])?;
        self.config.rate = rate;
        self.config.low_power = low_power;
        log::debug!("Requested data rate {target_hz}Hz, using {}Hz", rate.hz());
        Ok(rate.hz())
    }

    /// Store the wake-up, sleep, auto-sleep and link bits. They are written
    /// together with the measure bit on the next power transition.
    pub fn configure_power_control(&mut self, power: PowerControl) {
        self.config.power = PowerControl {
            measure: false,
            ..power
        };
    }

    /// Start measuring
    pub fn power_on(&mut self) -> Result<(), DriverError> {
        self.send_power_control(true)
    }

    /// Stop measuring (standby)
    pub fn power_off(&mut self) -> Result<(), DriverError> {
        self.send_power_control(false)
    }

    /// Read the current X, Y and Z acceleration in g
    pub fn read_sample(&mut self) -> Result<AxisData, DriverError> {
        let bytes = self.transport.read_exact(REG_DATAX0, SAMPLE_SIZE)?;
        Ok(AxisData {
            x: self.convert(bytes[0], bytes[1]),
            y: self.convert(bytes[2], bytes[3]),
            z: self.convert(bytes[4], bytes[5]),
        })
    }

    /// Convert one axis from its data register pair into g
    pub fn convert(&self, low: u8, high: u8) -> f64 {
        let mut value = twos_complement(low, high);
        if !self.config.full_resolution {
            value <<= self.config.range as u8;
        }
        value as f64 * SCALE_FACTOR
    }

    /// Configure the FIFO. `samples` is the watermark (or the number of
    /// samples kept around a trigger event) and is truncated to 5 bits.
    pub fn set_fifo_mode(
        &mut self,
        mode: FifoMode,
        trigger: bool,
        samples: u8,
    ) -> Result<(), DriverError> {
        let value = FifoControl {
            mode,
            trigger,
            samples: (samples & 0x1F).into(),
        };
        self.write_register(REG_FIFO_CTL, value.pack()?[0])
    }

    /// Number of samples currently held by the FIFO
    pub fn fifo_count(&mut self) -> Result<u8, DriverError> {
        let status = self.transport.read(REG_FIFO_STATUS)?;
        Ok(status & 0x7F)
    }

    /// Read every sample the FIFO reported when this was called, oldest first
    pub fn drain_fifo(&mut self) -> Result<Vec<AxisData>, DriverError> {
        let count = self.fifo_count()?;
        log::trace!("Draining {count} samples from FIFO");
        (0..count).map(|_| self.read_sample()).collect()
    }

    /// Write the hardware offset registers. Units are g; one register LSB is
    /// 4 full resolution LSBs (15.6 mg).
    pub fn set_offset(&mut self, x: f64, y: f64, z: f64) -> Result<(), DriverError> {
        let encoded = [encode_offset(x)?, encode_offset(y)?, encode_offset(z)?];
        for (address, value) in [REG_OFSX, REG_OFSY, REG_OFSZ].into_iter().zip(encoded) {
            self.write_register(address, value)?;
        }
        Ok(())
    }

    /// Calibrate the offset registers. The device must rest with exactly one
    /// axis parallel to gravity. The offset registers are zeroed before the
    /// reading is taken and stay zeroed if the orientation is ambiguous.
    pub fn calibrate(&mut self) -> Result<AxisData, DriverError> {
        self.set_offset(0.0, 0.0, 0.0)?;
        let reading = self.read_sample()?;
        let offset = calibration_offset(reading)?;
        self.set_offset(offset.x, offset.y, offset.z)?;
        log::info!(
            "Calibrated offsets: x={} y={} z={}",
            offset.x,
            offset.y,
            offset.z
        );
        Ok(offset)
    }

    fn send_data_format(&mut self) -> Result<(), DriverError> {
        let value = DataFormat {
            full_resolution: self.config.full_resolution,
            range: self.config.range,
            ..Default::default()
        };
        self.write_register(REG_DATA_FORMAT, value.pack()?[0])
    }

    fn send_power_control(&mut self, measure: bool) -> Result<(), DriverError> {
        let value = PowerControl {
            measure,
            ..self.config.power
        };
        self.write_register(REG_POWER_CTL, value.pack()?[0])
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), DriverError> {
        log::trace!("ADXL345: write {value:#010b} to {address:#04x}");
        Ok(self.transport.write(address, value)?)
    }
}

/// Reconstruct a little-endian 16-bit two's complement value. Raw 0x8000
/// decodes to -32768 and every 16-bit pattern maps back to itself.
pub fn twos_complement(low: u8, high: u8) -> i32 {
    let value = low as i32 | ((high as i32) << 8);
    if value & 0x8000 != 0 {
        // Invert and add one, then negate
        -((value ^ 0xFFFF) + 1)
    } else {
        value
    }
}

/// Encode an offset in g into the signed byte written to an offset register
pub fn encode_offset(value: f64) -> Result<u8, DriverError> {
    let units = (value / SCALE_FACTOR / 4.0).round();
    if !(i8::MIN as f64..=i8::MAX as f64).contains(&units) {
        return Err(DriverError::OverflowOnEncode { value });
    }
    Ok(units as i8 as u8)
}

/// Returns the expected reading for a device at rest: +/-1g on the single
/// axis aligned with gravity and 0g on the other two.
pub fn gravity_target(reading: AxisData) -> Result<AxisData, DriverError> {
    let near = |value: f64, reference: f64| {
        value >= reference - GRAVITY_TOLERANCE && value <= reference + GRAVITY_TOLERANCE
    };
    let sign = |value: f64| if value > 0.0 { 1.0 } else { -1.0 };

    let AxisData { x, y, z } = reading;
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
    if near(ax, 1.0) && near(ay, 0.0) && near(az, 0.0) {
        Ok(AxisData::new(sign(x), 0.0, 0.0))
    } else if near(ax, 0.0) && near(ay, 1.0) && near(az, 0.0) {
        Ok(AxisData::new(0.0, sign(y), 0.0))
    } else if near(ax, 0.0) && near(ay, 0.0) && near(az, 1.0) {
        Ok(AxisData::new(0.0, 0.0, sign(z)))
    } else {
        Err(DriverError::AmbiguousOrientation { x, y, z })
    }
}

/// Returns the per-axis correction (target - measured) for the given
/// resting reading
pub fn calibration_offset(reading: AxisData) -> Result<AxisData, DriverError> {
    let target = gravity_target(reading)?;
    Ok(AxisData {
        x: target.x - reading.x,
        y: target.y - reading.y,
        z: target.z - reading.z,
    })
}
