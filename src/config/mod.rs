pub mod path;

#[cfg(test)]
mod config_test;

use std::{
    io,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use packed_struct::types::Integer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{acquisition::schedule::ScheduleKind, drivers::adxl345::registers::PowerControl};

/// Represents all possible errors loading a [RecorderConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Top level configuration for a recording run. Every field is optional in
/// the YAML file and falls back to its default.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct RecorderConfig {
    pub bus: BusConfig,
    pub accelerometer: AccelerometerConfig,
    pub gyroscope: GyroscopeConfig,
    pub compass: CompassConfig,
    pub schedule: ScheduleKind,
    pub sink: SinkConfig,
    /// Stop recording after this many samples
    pub max_samples: Option<u64>,
    pub simulation: SimulationConfig,
}

impl RecorderConfig {
    /// Load a [RecorderConfig] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<RecorderConfig, LoadError> {
        let config: RecorderConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [RecorderConfig] from the given YAML file
    pub fn from_yaml_file(path: &Path) -> Result<RecorderConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: RecorderConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the configuration from the given path, or from the first config
    /// file found in the search paths. Defaults are used when no file exists.
    pub fn load(explicit: Option<&Path>) -> Result<RecorderConfig, LoadError> {
        if let Some(path) = explicit {
            log::debug!("Loading config from {path:?}");
            return Self::from_yaml_file(path);
        }

        let Some(path) = path::find_config_file() else {
            log::debug!("No config file found, using defaults");
            return Ok(RecorderConfig::default());
        };
        log::info!("Loading config from {path:?}");
        Self::from_yaml_file(&path)
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BusKind {
    #[default]
    I2c,
    Spi,
    Simulated,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct BusConfig {
    pub kind: BusKind,
    pub i2c_device: String,
    /// Use the accelerometer's alternate I2C address (SDO pulled low)
    pub alternate_address: bool,
    pub spi_device: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            kind: BusKind::default(),
            i2c_device: "/dev/i2c-1".to_string(),
            alternate_address: true,
            spi_device: "/dev/spidev0.0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct AccelerometerConfig {
    pub rate_hz: f64,
    pub range_g: u8,
    pub full_resolution: bool,
    pub low_power: bool,
    pub power_control: PowerControlConfig,
}

impl Default for AccelerometerConfig {
    fn default() -> Self {
        Self {
            rate_hz: 800.0,
            range_g: 16,
            full_resolution: true,
            low_power: false,
            power_control: PowerControlConfig::default(),
        }
    }
}

/// Power-saving bits of the accelerometer's power control register
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct PowerControlConfig {
    pub link: bool,
    pub auto_sleep: bool,
    pub sleep: bool,
    /// Reading frequency in sleep mode as a 2-bit code (8, 4, 2 or 1 Hz)
    pub wake_up: u8,
}

impl PowerControlConfig {
    pub fn to_register(&self) -> PowerControl {
        PowerControl {
            link: self.link,
            auto_sleep: self.auto_sleep,
            measure: false,
            sleep: self.sleep,
            wake_up: Integer::from(self.wake_up & 0x03),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct GyroscopeConfig {
    pub enabled: bool,
    pub low_pass_filter: u8,
    pub sample_rate_divider: u16,
}

impl Default for GyroscopeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            low_pass_filter: 0,
            sample_rate_divider: 8,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct CompassConfig {
    pub enabled: bool,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    File,
    Console,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Directory recordings are written to
    pub directory: PathBuf,
    /// Console only: print one of every n samples
    pub keep_every_nth: u64,
    /// Warn when this many samples are waiting to be written
    pub backlog_warning: Option<usize>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            directory: PathBuf::from("/home/pi/sensor_recordings"),
            keep_every_nth: 1,
            backlog_warning: Some(10_000),
        }
    }
}

/// Settings for the simulated bus
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Noise amplitude in raw counts
    pub noise: i16,
}
