use serde::{Deserialize, Serialize};

use super::sample::SensorKind;

/// Decides which sensor the acquisition loop reads on a given iteration
pub trait SensorSchedule: Send {
    fn sensor_for(&self, iteration: u64) -> SensorKind;
}

impl<F> SensorSchedule for F
where
    F: Fn(u64) -> SensorKind + Send,
{
    fn sensor_for(&self, iteration: u64) -> SensorKind {
        self(iteration)
    }
}

/// Read the accelerometer on every iteration
#[derive(Clone, Copy, Debug, Default)]
pub struct AccelerometerOnly;

impl SensorSchedule for AccelerometerOnly {
    fn sensor_for(&self, _iteration: u64) -> SensorKind {
        SensorKind::Accelerometer
    }
}

/// Read the accelerometer most of the time and the gyroscope and compass on
/// fixed positions of a repeating cycle
#[derive(Clone, Debug)]
pub struct Interleaved {
    pub cycle: u64,
    pub gyroscope: Vec<u64>,
    pub compass: Vec<u64>,
}

impl Default for Interleaved {
    fn default() -> Self {
        Self {
            cycle: 16,
            gyroscope: vec![0, 11],
            compass: vec![6],
        }
    }
}

impl SensorSchedule for Interleaved {
    fn sensor_for(&self, iteration: u64) -> SensorKind {
        let position = iteration % self.cycle.max(1);
        if self.gyroscope.contains(&position) {
            SensorKind::Gyroscope
        } else if self.compass.contains(&position) {
            SensorKind::Compass
        } else {
            SensorKind::Accelerometer
        }
    }
}

/// Schedule selectable from the configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    #[default]
    AccelerometerOnly,
    Interleaved,
}

impl ScheduleKind {
    pub fn build(&self) -> Box<dyn SensorSchedule> {
        match self {
            ScheduleKind::AccelerometerOnly => Box::new(AccelerometerOnly),
            ScheduleKind::Interleaved => Box::new(Interleaved::default()),
        }
    }
}
