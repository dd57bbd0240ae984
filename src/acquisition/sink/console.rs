use std::io::{self, Stdout, Write};

use crate::acquisition::sample::Sample;

use super::{SampleWriter, SinkError};

/// Prints every nth sample to an output stream, stdout by default
#[derive(Debug)]
pub struct ConsoleWriter<W: Write + Send = Stdout> {
    output: W,
    keep_every_nth: u64,
    count: u64,
}

impl ConsoleWriter<Stdout> {
    pub fn new(keep_every_nth: u64) -> Result<Self, SinkError> {
        Self::with_output(io::stdout(), keep_every_nth)
    }
}

impl<W: Write + Send> ConsoleWriter<W> {
    pub fn with_output(output: W, keep_every_nth: u64) -> Result<Self, SinkError> {
        if keep_every_nth == 0 {
            return Err(SinkError::InvalidArgument(
                "keep_every_nth must be at least 1".into(),
            ));
        }
        Ok(Self {
            output,
            keep_every_nth,
            count: 0,
        })
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write + Send> SampleWriter for ConsoleWriter<W> {
    fn write_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
        // Counter spans the whole run
        let keep = self.count % self.keep_every_nth == 0;
        self.count += 1;
        if keep {
            writeln!(self.output, "{sample}")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.output.flush()?;
        Ok(())
    }
}
