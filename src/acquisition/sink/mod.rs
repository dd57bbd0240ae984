#[cfg(test)]
pub mod capture;
pub mod client;
pub mod console;
pub mod file;

use std::{
    io::{self, Stdout},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::config::{SinkConfig, SinkKind};

use self::{client::SinkClient, console::ConsoleWriter, file::FileWriter};

use super::sample::Sample;

/// Represents all possible errors raised while emitting samples
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Could not write: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Stop flag shared between the acquisition loop and a sink. It is only ever
/// set or cleared as a whole and read by [SinkClient::accept].
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the acquisition loop to stop at its next hand-off
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Mark the sink as running again
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A [SampleWriter] performs the I/O side effect for each dequeued sample
pub trait SampleWriter: Send {
    fn write_sample(&mut self, sample: &Sample) -> Result<(), SinkError>;

    /// Called whenever the queue runs dry and when the drain loop exits
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Consumer side of the acquisition pipeline. Samples handed to any
/// [SinkClient] are queued without blocking and written by [SinkDriver::run]
/// on its own thread.
#[derive(Debug)]
pub struct SinkDriver<T: SampleWriter> {
    writer: T,
    tx: UnboundedSender<Sample>,
    rx: UnboundedReceiver<Sample>,
    stop: StopSignal,
    backlog: Arc<AtomicUsize>,
    backlog_warning: Option<usize>,
}

impl<T: SampleWriter> SinkDriver<T> {
    pub fn new(writer: T, stop: StopSignal) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            writer,
            tx,
            rx,
            stop,
            backlog: Arc::new(AtomicUsize::new(0)),
            backlog_warning: None,
        }
    }

    /// Log a warning whenever the number of queued samples reaches `limit`
    pub fn with_backlog_warning(mut self, limit: Option<usize>) -> Self {
        self.backlog_warning = limit;
        self
    }

    /// Returns a client that hands samples to this sink
    pub fn client(&self) -> SinkClient {
        SinkClient::new(
            self.tx.clone(),
            self.stop.clone(),
            self.backlog.clone(),
            self.backlog_warning,
        )
    }

    /// Drain the queue into the writer until every client has been dropped
    /// and the queue is empty. The queue is polled without waiting; the
    /// producer is paced by bus latency so the poll rarely spins for long.
    /// If the writer fails, the stop flag is raised before the error is
    /// returned so the producer stops queueing.
    pub fn run(self) -> Result<T, SinkError> {
        let Self {
            mut writer,
            tx,
            mut rx,
            stop,
            backlog,
            ..
        } = self;
        stop.reset();
        // Only clients keep the channel open from here on
        drop(tx);
        log::debug!("Starting sink drain loop");

        let fail = |error: SinkError| {
            log::error!("Unable to write sample: {error}");
            stop.stop();
            error
        };

        let mut written: u64 = 0;
        let mut flushed = true;
        loop {
            match rx.try_recv() {
                Ok(sample) => {
                    backlog.fetch_sub(1, Ordering::SeqCst);
                    if let Err(e) = writer.write_sample(&sample) {
                        return Err(fail(e));
                    }
                    written += 1;
                    flushed = false;
                }
                Err(TryRecvError::Empty) => {
                    if !flushed {
                        if let Err(e) = writer.flush() {
                            return Err(fail(e));
                        }
                        flushed = true;
                    }
                    thread::yield_now();
                }
                Err(TryRecvError::Disconnected) => break,
            }
        }

        writer.flush()?;
        log::debug!("Sink drain loop stopped after {written} samples");
        Ok(writer)
    }
}

/// Sink selected from the configuration
#[derive(Debug)]
pub enum Sink {
    File(SinkDriver<FileWriter>),
    Console(SinkDriver<ConsoleWriter<Stdout>>),
}

impl Sink {
    pub fn new(config: &SinkConfig, stop: StopSignal) -> Result<Self, SinkError> {
        let sink = match config.kind {
            SinkKind::File => {
                let writer = FileWriter::new(config.directory.clone());
                Sink::File(SinkDriver::new(writer, stop))
            }
            SinkKind::Console => {
                let writer = ConsoleWriter::new(config.keep_every_nth)?;
                Sink::Console(SinkDriver::new(writer, stop))
            }
        };
        Ok(sink.with_backlog_warning(config.backlog_warning))
    }

    fn with_backlog_warning(self, limit: Option<usize>) -> Self {
        match self {
            Sink::File(driver) => Sink::File(driver.with_backlog_warning(limit)),
            Sink::Console(driver) => Sink::Console(driver.with_backlog_warning(limit)),
        }
    }

    pub fn client(&self) -> SinkClient {
        match self {
            Sink::File(driver) => driver.client(),
            Sink::Console(driver) => driver.client(),
        }
    }

    pub fn run(self) -> Result<(), SinkError> {
        match self {
            Sink::File(driver) => {
                let writer = driver.run()?;
                if let Some(path) = writer.path() {
                    log::info!("Wrote {} samples to {path:?}", writer.written());
                }
            }
            Sink::Console(driver) => {
                driver.run()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::{acquisition::sample::SensorKind, drivers::AxisData};

    use super::{capture::CaptureWriter, *};

    struct FailingWriter;

    impl SampleWriter for FailingWriter {
        fn write_sample(&mut self, _sample: &Sample) -> Result<(), SinkError> {
            Err(io::Error::other("disk full").into())
        }
    }

    fn sample(t: f64) -> Sample {
        Sample::new(SensorKind::Accelerometer, AxisData::new(t, 0.0, 1.0), t)
    }

    #[test]
    fn test_drain_preserves_order() {
        let stop = StopSignal::new();
        let driver = SinkDriver::new(CaptureWriter::default(), stop.clone());
        let client = driver.client();
        for i in 0..100 {
            assert!(client.accept(sample(i as f64)));
        }
        assert_eq!(client.backlog(), 100);

        let handle = thread::spawn(move || driver.run());
        drop(client);
        let writer = handle.join().unwrap().unwrap();
        let times: Vec<f64> = writer.samples().iter().map(|s| s.timestamp_ms()).collect();
        assert_eq!(times, (0..100).map(|i| i as f64).collect::<Vec<f64>>());
    }

    #[test]
    fn test_accept_after_stop() {
        let stop = StopSignal::new();
        let driver = SinkDriver::new(CaptureWriter::default(), stop.clone());
        let client = driver.client();
        assert!(client.accept(sample(0.0)));
        stop.stop();
        assert!(!client.accept(sample(1.0)));
        assert_eq!(client.backlog(), 1);

        // Running the drain loop clears the flag
        let handle = thread::spawn(move || driver.run());
        while stop.is_stopped() {
            thread::yield_now();
        }
        assert!(client.accept(sample(2.0)));
        drop(client);
        let writer = handle.join().unwrap().unwrap();
        assert_eq!(writer.samples().len(), 2);
    }

    #[test]
    fn test_write_failure_raises_stop() {
        let stop = StopSignal::new();
        let driver = SinkDriver::new(FailingWriter, stop.clone());
        let client = driver.client();
        assert!(client.accept(sample(0.0)));

        let result = thread::spawn(move || driver.run()).join().unwrap();
        assert!(matches!(result, Err(SinkError::Io(_))));
        assert!(stop.is_stopped());
        assert!(!client.accept(sample(1.0)));
    }

    #[test]
    fn test_run_without_clients_returns() {
        let driver = SinkDriver::new(CaptureWriter::default(), StopSignal::new());
        drop(driver.client());
        let writer = driver.run().unwrap();
        assert!(writer.samples().is_empty());
    }

    #[test]
    fn test_accept_after_consumer_dropped() {
        let stop = StopSignal::new();
        let driver = SinkDriver::new(CaptureWriter::default(), stop.clone());
        let client = driver.client();
        drop(driver);

        assert!(!stop.is_stopped());
        assert!(!client.accept(sample(0.0)));
        assert_eq!(client.backlog(), 0);
    }
}
