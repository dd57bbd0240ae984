use std::{error::Error, time::Duration};

use tokio::time::{sleep, Instant};

use crate::{
    acquisition::sample::{Sample, SensorKind},
    config::RecorderConfig,
    drivers::adxl345::{registers::FifoMode, FIFO_DEPTH},
};

use super::device::open_accelerometer;

/// Longest time to wait for the FIFO to fill
const FILL_TIMEOUT: Duration = Duration::from_secs(15);

/// Fill the FIFO in stream mode and print what it holds. Sample times are
/// derived from the configured data rate.
pub async fn handle_fifo(config: &RecorderConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut accelerometer = open_accelerometer(config)?;
    accelerometer.set_fifo_mode(FifoMode::Stream, false, FIFO_DEPTH - 1)?;
    accelerometer.power_on()?;

    let period_ms = 1000.0 / accelerometer.configuration().rate.hz();
    let poll = Duration::from_secs_f64(period_ms / 1000.0).max(Duration::from_millis(1));
    let started = Instant::now();
    loop {
        let count = accelerometer.fifo_count()?;
        if count >= FIFO_DEPTH {
            break;
        }
        if started.elapsed() > FILL_TIMEOUT {
            log::warn!("FIFO holds only {count} samples after {FILL_TIMEOUT:?}");
            break;
        }
        sleep(poll).await;
    }

    let samples = accelerometer.drain_fifo()?;
    accelerometer.power_off()?;
    accelerometer.set_fifo_mode(FifoMode::Bypass, false, 0)?;

    for (i, data) in samples.into_iter().enumerate() {
        let sample = Sample::new(SensorKind::Accelerometer, data, i as f64 * period_ms);
        println!("{sample}");
    }
    Ok(())
}
