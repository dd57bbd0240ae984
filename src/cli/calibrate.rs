use std::error::Error;

use serde::Serialize;

use crate::{
    config::RecorderConfig,
    drivers::{adxl345::driver::encode_offset, AxisData},
};

use super::device::open_accelerometer;

/// Offsets applied by a calibration run
#[derive(Debug, Serialize)]
struct CalibrationReport {
    /// Offset per axis in g
    x: f64,
    y: f64,
    z: f64,
    /// Values written to the OFSX, OFSY and OFSZ registers
    registers: [i8; 3],
}

impl CalibrationReport {
    fn new(offset: AxisData) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let registers = [
            encode_offset(offset.x)? as i8,
            encode_offset(offset.y)? as i8,
            encode_offset(offset.z)? as i8,
        ];
        Ok(Self {
            x: offset.x,
            y: offset.y,
            z: offset.z,
            registers,
        })
    }
}

pub fn handle_calibrate(
    config: &RecorderConfig,
    json: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut accelerometer = open_accelerometer(config)?;
    accelerometer.power_on()?;
    let result = accelerometer.calibrate();
    accelerometer.power_off()?;
    let report = CalibrationReport::new(result?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Offsets (g): x={} y={} z={}", report.x, report.y, report.z);
    println!(
        "Offset registers: x={} y={} z={}",
        report.registers[0], report.registers[1], report.registers[2]
    );
    Ok(())
}
