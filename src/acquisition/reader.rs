use std::{
    collections::HashMap,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use crate::drivers::DriverError;

use super::{
    sample::{Sample, SensorKind},
    schedule::{AccelerometerOnly, SensorSchedule},
    sink::client::SinkClient,
    source::SensorSource,
};

/// Summary of a finished acquisition run
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReaderStats {
    /// Samples handed to the sink
    pub samples_read: u64,
    /// Samples read during the last completed wall-clock second
    pub samples_per_sec: u64,
    pub elapsed: Duration,
}

/// Returns the current wall-clock second
pub type Clock = Box<dyn Fn() -> u64 + Send>;

/// Producer side of the acquisition pipeline. Polls the attached sensors as
/// fast as the bus allows and hands each timestamped sample to a sink.
pub struct SensorReader {
    accelerometer: Box<dyn SensorSource>,
    others: HashMap<SensorKind, Box<dyn SensorSource>>,
    schedule: Box<dyn SensorSchedule>,
    max_samples: Option<u64>,
    clock: Clock,
}

impl SensorReader {
    pub fn new(accelerometer: Box<dyn SensorSource>) -> Self {
        Self {
            accelerometer,
            others: HashMap::new(),
            schedule: Box::new(AccelerometerOnly),
            max_samples: None,
            clock: Box::new(wall_clock_second),
        }
    }

    /// Attach another sensor. A source of a kind that is already attached
    /// replaces the previous one.
    pub fn with_source(mut self, source: Box<dyn SensorSource>) -> Self {
        match source.kind() {
            SensorKind::Accelerometer => self.accelerometer = source,
            kind => {
                self.others.insert(kind, source);
            }
        }
        self
    }

    pub fn with_schedule(mut self, schedule: Box<dyn SensorSchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Stop after the given number of samples have been accepted
    pub fn with_max_samples(mut self, max_samples: Option<u64>) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Replace the clock that drives the per-second throughput count
    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Read samples into the given sink until it refuses one, the sample
    /// limit is reached or a sensor fails. Sensors are started first and
    /// stopped again before returning.
    pub fn run(&mut self, sink: &SinkClient) -> Result<ReaderStats, DriverError> {
        let result = self.start_sources().and_then(|()| self.acquire(sink));
        self.stop_sources();
        result
    }

    fn acquire(&mut self, sink: &SinkClient) -> Result<ReaderStats, DriverError> {
        let start = Instant::now();
        let mut stats = ReaderStats::default();
        let mut current_second = (self.clock)();
        let mut second_count: u64 = 0;
        let mut iteration: u64 = 0;

        log::info!("Starting acquisition");
        loop {
            if self.max_samples.is_some_and(|max| stats.samples_read >= max) {
                log::info!("Reached sample limit of {}", stats.samples_read);
                break;
            }

            let kind = self.schedule.sensor_for(iteration);
            iteration += 1;
            let source = match self.others.get_mut(&kind) {
                Some(source) => source.as_mut(),
                None => self.accelerometer.as_mut(),
            };

            let data = match source.read() {
                Ok(data) => data,
                Err(e) => {
                    log::error!("Failed to read {kind:?}: {e}");
                    return Err(e);
                }
            };
            let timestamp_ms = start.elapsed().as_secs_f64() * 1000.0;
            let sample = Sample::new(source.kind(), data, timestamp_ms);

            if !sink.accept(sample) {
                log::info!("Sink stopped accepting samples");
                break;
            }
            stats.samples_read += 1;

            let second = (self.clock)();
            if second != current_second {
                stats.samples_per_sec = second_count;
                log::info!(
                    "Samples read: {} (samples/sec: {}, backlog: {})",
                    stats.samples_read,
                    second_count,
                    sink.backlog()
                );
                current_second = second;
                second_count = 0;
            }
            second_count += 1;
        }

        stats.elapsed = start.elapsed();
        log::info!(
            "Acquisition finished: {} samples in {:.3}s",
            stats.samples_read,
            stats.elapsed.as_secs_f64()
        );
        Ok(stats)
    }

    fn start_sources(&mut self) -> Result<(), DriverError> {
        self.accelerometer.start()?;
        for source in self.others.values_mut() {
            source.start()?;
        }
        Ok(())
    }

    fn stop_sources(&mut self) {
        let sources = std::iter::once(&mut self.accelerometer).chain(self.others.values_mut());
        for source in sources {
            if let Err(e) = source.stop() {
                log::warn!("Unable to stop {:?}: {e}", source.kind());
            }
        }
    }
}

fn wall_clock_second() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
