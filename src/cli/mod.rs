pub mod calibrate;
pub mod device;
pub mod fifo;
pub mod record;

use std::{error::Error, io, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{BusKind, RecorderConfig, SinkKind};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub overrides: Overrides,
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

/// Settings that take precedence over the config file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Bus the accelerometer is attached to
    #[arg(long, global = true)]
    pub bus: Option<BusKind>,
    /// Target accelerometer data rate in Hz
    #[arg(long, global = true)]
    pub rate: Option<f64>,
    /// Accelerometer range in g (2, 4, 8 or 16)
    #[arg(long, global = true)]
    pub range: Option<u8>,
    /// Where samples are written
    #[arg(long, global = true)]
    pub sink: Option<SinkKind>,
    /// Directory recordings are written to
    #[arg(long, global = true)]
    pub directory: Option<PathBuf>,
    /// Console sink only: print one of every n samples
    #[arg(long, global = true)]
    pub keep_every_nth: Option<u64>,
    /// Stop recording after this many samples
    #[arg(long, global = true)]
    pub max_samples: Option<u64>,
}

impl Overrides {
    /// Apply the given command line values on top of the config
    pub fn apply(&self, config: &mut RecorderConfig) {
        if let Some(bus) = self.bus {
            config.bus.kind = bus;
        }
        if let Some(rate) = self.rate {
            config.accelerometer.rate_hz = rate;
        }
        if let Some(range) = self.range {
            config.accelerometer.range_g = range;
        }
        if let Some(sink) = self.sink {
            config.sink.kind = sink;
        }
        if let Some(directory) = self.directory.as_ref() {
            config.sink.directory = directory.clone();
        }
        if let Some(n) = self.keep_every_nth {
            config.sink.keep_every_nth = n;
        }
        if let Some(max) = self.max_samples {
            config.max_samples = Some(max);
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Record samples until interrupted (default)
    Record,
    /// Calibrate the accelerometer offset registers. The device must rest
    /// with one axis pointing straight up or down.
    Calibrate {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fill the accelerometer FIFO in stream mode and print its contents
    Fifo,
    /// Check the attached sensors and print the effective configuration
    Info,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

pub async fn main_cli(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let cmd = args.cmd.unwrap_or(Commands::Record);
    if let Commands::Completions { shell } = cmd {
        let mut command = Args::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut io::stdout());
        return Ok(());
    }

    let mut config = RecorderConfig::load(args.config.as_deref())?;
    args.overrides.apply(&mut config);
    log::debug!("Using config: {config:?}");

    match cmd {
        Commands::Record => record::handle_record(config).await?,
        Commands::Calibrate { json } => calibrate::handle_calibrate(&config, json)?,
        Commands::Fifo => fifo::handle_fifo(&config).await?,
        Commands::Info => device::handle_info(&config)?,
        Commands::Completions { .. } => (),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let args = Args::parse_from([
            "imurecorder",
            "--bus",
            "simulated",
            "--rate",
            "100",
            "--sink",
            "console",
            "--keep-every-nth",
            "4",
            "calibrate",
            "--json",
        ]);
        assert!(matches!(args.cmd, Some(Commands::Calibrate { json: true })));

        let mut config = RecorderConfig::default();
        args.overrides.apply(&mut config);
        assert_eq!(config.bus.kind, BusKind::Simulated);
        assert_eq!(config.accelerometer.rate_hz, 100.0);
        assert_eq!(config.accelerometer.range_g, 16);
        assert_eq!(config.sink.kind, SinkKind::Console);
        assert_eq!(config.sink.keep_every_nth, 4);
    }

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }
}
