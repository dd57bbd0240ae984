use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::acquisition::sample::{Sample, HEADER};

use super::{SampleWriter, SinkError};

/// Prefix of every recording file name
const FILE_PREFIX: &str = "recording_";

/// Writes samples to a new numbered recording file. The file is created when
/// the first sample arrives.
#[derive(Debug)]
pub struct FileWriter {
    directory: PathBuf,
    path: Option<PathBuf>,
    file: Option<BufWriter<File>>,
    written: u64,
}

impl FileWriter {
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            path: None,
            file: None,
            written: 0,
        }
    }

    /// Path of the recording, once one has been opened
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of samples written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    fn open(&mut self) -> Result<BufWriter<File>, SinkError> {
        fs::create_dir_all(&self.directory)?;
        let path = next_recording_path(&self.directory)?;
        let mut file = BufWriter::new(File::create(&path)?);
        writeln!(file, "{HEADER}")?;
        log::info!("Writing to file {path:?}");
        self.path = Some(path);
        self.written = 0;
        Ok(file)
    }
}

impl SampleWriter for FileWriter {
    fn write_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => {
                let file = self.open()?;
                self.file.insert(file)
            }
        };
        writeln!(file, "{sample}")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Returns the path of the next recording in the given directory. Files are
/// named "recording_N"; the new file uses one more than the highest N found.
pub fn next_recording_path(directory: &Path) -> io::Result<PathBuf> {
    let mut max_number = 0;
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(suffix) = name.to_str().and_then(|n| n.strip_prefix(FILE_PREFIX)) else {
            continue;
        };
        match suffix.parse::<u64>() {
            Ok(number) => max_number = max_number.max(number),
            Err(_) => log::debug!("Ignoring file with non-numeric suffix: {name:?}"),
        }
    }

    Ok(directory.join(format!("{FILE_PREFIX}{}", max_number + 1)))
}

#[cfg(test)]
mod tests {
    use crate::{acquisition::sample::SensorKind, drivers::AxisData};

    use super::*;

    #[test]
    fn test_next_recording_path() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(next_recording_path(dir.path())?, dir.path().join("recording_1"));

        for name in ["recording_3", "recording_10", "recording_x", "notes.txt"] {
            File::create(dir.path().join(name))?;
        }
        fs::create_dir(dir.path().join("recording_99"))?;
        assert_eq!(
            next_recording_path(dir.path())?,
            dir.path().join("recording_11")
        );

        Ok(())
    }

    #[test]
    fn test_writes_header_once() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let directory = dir.path().join("recordings");
        let mut writer = FileWriter::new(directory.clone());
        assert!(writer.path().is_none());

        for i in 0..3 {
            let sample = Sample::new(
                SensorKind::Accelerometer,
                AxisData::new(0.0, 0.5, 1.0),
                i as f64,
            );
            writer.write_sample(&sample)?;
        }
        writer.flush()?;

        let path = writer.path().unwrap().to_path_buf();
        assert_eq!(path, directory.join("recording_1"));
        let content = fs::read_to_string(path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                HEADER,
                "acc,0,0.5,1,0.0000",
                "acc,0,0.5,1,1.0000",
                "acc,0,0.5,1,2.0000"
            ]
        );

        Ok(())
    }
}
