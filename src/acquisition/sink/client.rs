use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::mpsc::UnboundedSender;

use crate::acquisition::sample::Sample;

use super::StopSignal;

/// Producer side handle to a sink
#[derive(Clone, Debug)]
pub struct SinkClient {
    tx: UnboundedSender<Sample>,
    stop: StopSignal,
    backlog: Arc<AtomicUsize>,
    backlog_warning: Option<usize>,
}

impl SinkClient {
    pub fn new(
        tx: UnboundedSender<Sample>,
        stop: StopSignal,
        backlog: Arc<AtomicUsize>,
        backlog_warning: Option<usize>,
    ) -> Self {
        Self {
            tx,
            stop,
            backlog,
            backlog_warning,
        }
    }

    /// Queue the given sample without blocking. Returns false once the sink
    /// has been told to stop or is no longer draining, in which case the
    /// sample is dropped.
    pub fn accept(&self, sample: Sample) -> bool {
        if self.stop.is_stopped() {
            return false;
        }

        let pending = self.backlog.fetch_add(1, Ordering::SeqCst) + 1;
        if self.tx.send(sample).is_err() {
            self.backlog.fetch_sub(1, Ordering::SeqCst);
            log::warn!("Sink is no longer receiving samples");
            return false;
        }

        if self.backlog_warning == Some(pending) {
            log::warn!("Sink is falling behind: {pending} samples waiting to be written");
        }

        true
    }

    /// Number of samples accepted but not yet written
    pub fn backlog(&self) -> usize {
        self.backlog.load(Ordering::SeqCst)
    }
}
