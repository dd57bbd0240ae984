use std::{
    fs,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread,
};

use crate::{
    acquisition::{
        reader::{Clock, SensorReader},
        sample::{Sample, SensorKind, HEADER},
        schedule::Interleaved,
        sink::{capture::CaptureWriter, file::FileWriter, SinkDriver, StopSignal},
        source::SensorSource,
    },
    drivers::{
        adxl345::driver::Driver,
        transport::simulated::{Motion, SimulatedAdxl345},
        AxisData, DriverError,
    },
};

/// Sensor that returns its read count on every axis
struct CountingSource {
    kind: SensorKind,
    reads: u64,
    started: bool,
    stopped: Arc<AtomicBool>,
    stop_on_read: Option<(u64, StopSignal)>,
}

impl CountingSource {
    fn new(kind: SensorKind) -> Self {
        Self {
            kind,
            reads: 0,
            started: false,
            stopped: Arc::new(AtomicBool::new(false)),
            stop_on_read: None,
        }
    }

    /// Raise the stop flag while serving the given read
    fn stopping_at(mut self, read: u64, stop: StopSignal) -> Self {
        self.stop_on_read = Some((read, stop));
        self
    }
}

impl SensorSource for CountingSource {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn start(&mut self) -> Result<(), DriverError> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn read(&mut self) -> Result<AxisData, DriverError> {
        if !self.started {
            return Err(DriverError::InvalidArgument("not started".into()));
        }
        self.reads += 1;
        if let Some((read, stop)) = &self.stop_on_read {
            if *read == self.reads {
                stop.stop();
            }
        }
        let value = self.reads as f64;
        Ok(AxisData::new(value, value, value))
    }
}

/// Sensor that cannot be started
struct BrokenSource(SensorKind);

impl SensorSource for BrokenSource {
    fn kind(&self) -> SensorKind {
        self.0
    }

    fn start(&mut self) -> Result<(), DriverError> {
        Err(DriverError::InvalidArgument("no device".into()))
    }

    fn read(&mut self) -> Result<AxisData, DriverError> {
        Err(DriverError::InvalidArgument("no device".into()))
    }
}

/// Clock that reads second 0 when the run starts and for the first seven
/// samples, second 1 for samples 8 to 10 and second 2 afterwards
fn stepped_clock() -> Clock {
    let calls = AtomicU64::new(0);
    Box::new(move || match calls.fetch_add(1, Ordering::SeqCst) {
        0..=7 => 0,
        8..=10 => 1,
        _ => 2,
    })
}

fn capture_sink(stop: &StopSignal) -> SinkDriver<CaptureWriter> {
    SinkDriver::new(CaptureWriter::default(), stop.clone())
}

#[test]
fn test_record_simulated_device_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut accelerometer = Driver::new(SimulatedAdxl345::new(Motion::default()));
    accelerometer.configure_range(16, true)?;
    accelerometer.configure_rate(3200.0, false)?;

    let stop = StopSignal::new();
    let sink = SinkDriver::new(FileWriter::new(dir.path().to_path_buf()), stop.clone());
    let client = sink.client();
    let drain = thread::spawn(move || sink.run());

    let mut reader = SensorReader::new(Box::new(accelerometer)).with_max_samples(Some(1000));
    let stats = reader.run(&client)?;
    drop(client);
    let writer = drain.join().unwrap()?;

    assert_eq!(stats.samples_read, 1000);
    assert_eq!(writer.written(), 1000);
    let path = dir.path().join("recording_1");
    assert_eq!(writer.path(), Some(path.as_path()));

    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1001);
    assert_eq!(lines[0], HEADER);

    let mut last_time = 0.0;
    for line in &lines[1..] {
        let sample: Sample = line.parse()?;
        assert_eq!(sample.kind(), SensorKind::Accelerometer);
        assert!(sample.timestamp_ms() >= last_time);
        assert!((sample.z() - 1.0).abs() < 1e-9);
        last_time = sample.timestamp_ms();
    }

    Ok(())
}

#[test]
fn test_stop_before_run_accepts_nothing() -> Result<(), DriverError> {
    let stop = StopSignal::new();
    let sink = capture_sink(&stop);
    let client = sink.client();
    stop.stop();

    let mut reader = SensorReader::new(Box::new(CountingSource::new(SensorKind::Accelerometer)));
    let stats = reader.run(&client)?;
    assert_eq!(stats.samples_read, 0);
    assert_eq!(client.backlog(), 0);
    Ok(())
}

#[test]
fn test_stop_during_run_drops_in_flight_sample() -> Result<(), DriverError> {
    let stop = StopSignal::new();
    let sink = capture_sink(&stop);
    let client = sink.client();

    let source = CountingSource::new(SensorKind::Accelerometer).stopping_at(10, stop.clone());
    let mut reader = SensorReader::new(Box::new(source));
    let stats = reader.run(&client)?;
    assert_eq!(stats.samples_read, 9);
    drop(client);

    let writer = sink.run().unwrap();
    let xs: Vec<f64> = writer.samples().iter().map(|s| s.x()).collect();
    assert_eq!(xs, (1..=9).map(|i| i as f64).collect::<Vec<f64>>());
    Ok(())
}

#[test]
fn test_interleaved_schedule_tags_samples() -> Result<(), DriverError> {
    let stop = StopSignal::new();
    let sink = capture_sink(&stop);
    let client = sink.client();

    let mut reader = SensorReader::new(Box::new(CountingSource::new(SensorKind::Accelerometer)))
        .with_source(Box::new(CountingSource::new(SensorKind::Gyroscope)))
        .with_source(Box::new(CountingSource::new(SensorKind::Compass)))
        .with_schedule(Box::new(Interleaved::default()))
        .with_max_samples(Some(32));
    reader.run(&client)?;
    drop(client);

    let writer = sink.run().unwrap();
    let samples = writer.samples();
    assert_eq!(samples.len(), 32);
    assert_eq!(samples[0].kind(), SensorKind::Gyroscope);
    assert_eq!(samples[6].kind(), SensorKind::Compass);
    assert_eq!(samples[11].kind(), SensorKind::Gyroscope);
    assert_eq!(samples[16].kind(), SensorKind::Gyroscope);
    // Each source keeps its own read count
    assert_eq!(samples[16].x(), 3.0);
    assert_eq!(samples[22].x(), 2.0);
    assert_eq!(samples[31].x(), 26.0);
    Ok(())
}

#[test]
fn test_missing_source_falls_back_to_accelerometer() -> Result<(), DriverError> {
    let stop = StopSignal::new();
    let sink = capture_sink(&stop);
    let client = sink.client();

    let mut reader = SensorReader::new(Box::new(CountingSource::new(SensorKind::Accelerometer)))
        .with_schedule(Box::new(|_: u64| SensorKind::Compass))
        .with_max_samples(Some(5));
    reader.run(&client)?;
    drop(client);

    let writer = sink.run().unwrap();
    assert!(writer
        .samples()
        .iter()
        .all(|s| s.kind() == SensorKind::Accelerometer));
    assert_eq!(writer.samples().len(), 5);
    Ok(())
}

#[test]
fn test_transport_error_ends_run() {
    let stop = StopSignal::new();
    let sink = capture_sink(&stop);
    let client = sink.client();

    // One transfer to power on, then four reads
    let transport = SimulatedAdxl345::default().with_failure_after(5);
    let mut reader = SensorReader::new(Box::new(Driver::new(transport)));
    let result = reader.run(&client);
    assert!(matches!(result, Err(DriverError::Transport(_))));
    drop(client);

    let writer = sink.run().unwrap();
    assert_eq!(writer.samples().len(), 4);
}

#[test]
fn test_samples_per_sec_counts_previous_second() -> Result<(), DriverError> {
    let stop = StopSignal::new();
    let sink = capture_sink(&stop);
    let client = sink.client();

    let mut reader = SensorReader::new(Box::new(CountingSource::new(SensorKind::Accelerometer)))
        .with_clock(stepped_clock())
        .with_max_samples(Some(8));
    let stats = reader.run(&client)?;
    // The sample that crossed into second 1 is not counted for second 0
    assert_eq!(stats.samples_read, 8);
    assert_eq!(stats.samples_per_sec, 7);

    let mut reader = SensorReader::new(Box::new(CountingSource::new(SensorKind::Accelerometer)))
        .with_clock(stepped_clock())
        .with_max_samples(Some(12));
    let stats = reader.run(&client)?;
    assert_eq!(stats.samples_read, 12);
    assert_eq!(stats.samples_per_sec, 3);
    Ok(())
}

#[test]
fn test_failed_start_stops_started_sources() {
    let stop = StopSignal::new();
    let sink = capture_sink(&stop);
    let client = sink.client();

    let accelerometer = CountingSource::new(SensorKind::Accelerometer);
    let stopped = accelerometer.stopped.clone();
    let mut reader = SensorReader::new(Box::new(accelerometer))
        .with_source(Box::new(BrokenSource(SensorKind::Gyroscope)));
    let result = reader.run(&client);

    assert!(matches!(result, Err(DriverError::InvalidArgument(_))));
    assert!(stopped.load(Ordering::SeqCst));
    assert_eq!(client.backlog(), 0);
}
