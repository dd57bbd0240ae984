use std::{fmt, num::ParseFloatError, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drivers::AxisData;

/// First line of every recording
pub const HEADER: &str = "Sensor type,x,y,z,time (ms)";

/// Timestamps are written with this many fractional millisecond digits
const TIME_SCALE: f64 = 10_000.0;

/// Represents all possible errors decoding a [Sample] from its text form
#[derive(Error, Debug, PartialEq)]
pub enum SampleParseError {
    #[error("Expected 5 comma separated fields, found {0}")]
    FieldCount(usize),
    #[error("Unknown sensor type: {0}")]
    UnknownSensor(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] ParseFloatError),
}

/// The sensor a [Sample] was read from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Compass,
}

impl SensorKind {
    /// Short name used in recordings
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "acc",
            SensorKind::Gyroscope => "gyr",
            SensorKind::Compass => "comp",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = SampleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acc" => Ok(SensorKind::Accelerometer),
            "gyr" => Ok(SensorKind::Gyroscope),
            "comp" => Ok(SensorKind::Compass),
            _ => Err(SampleParseError::UnknownSensor(s.to_string())),
        }
    }
}

/// A single timestamped reading from one sensor. The timestamp is in
/// milliseconds since the start of the acquisition run.
///
/// The text form is `kind,x,y,z,time` with the time truncated to four
/// fractional digits; decoding it gives back the same axes and kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    kind: SensorKind,
    x: f64,
    y: f64,
    z: f64,
    timestamp_ms: f64,
}

impl Sample {
    pub fn new(kind: SensorKind, data: AxisData, timestamp_ms: f64) -> Self {
        Self {
            kind,
            x: data.x,
            y: data.y,
            z: data.z,
            timestamp_ms,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let time = (self.timestamp_ms * TIME_SCALE).trunc() / TIME_SCALE;
        write!(
            f,
            "{},{},{},{},{:.4}",
            self.kind, self.x, self.y, self.z, time
        )
    }
}

impl FromStr for Sample {
    type Err = SampleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end().split(',').map(|field| field.trim()).collect();
        let [kind, x, y, z, time] = fields.as_slice() else {
            return Err(SampleParseError::FieldCount(fields.len()));
        };

        Ok(Sample {
            kind: kind.parse()?,
            x: x.parse()?,
            y: y.parse()?,
            z: z.parse()?,
            timestamp_ms: time.parse()?,
        })
    }
}
