use crate::acquisition::sample::Sample;

use super::{SampleWriter, SinkError};

/// Keeps every sample in memory
#[derive(Debug, Default)]
pub struct CaptureWriter {
    samples: Vec<Sample>,
}

impl CaptureWriter {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl SampleWriter for CaptureWriter {
    fn write_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
        self.samples.push(*sample);
        Ok(())
    }
}
