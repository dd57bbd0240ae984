use std::error::Error;

use crate::{
    acquisition::{
        reader::SensorReader,
        sink::{Sink, StopSignal},
    },
    config::RecorderConfig,
};

use super::device::{open_accelerometer, open_compass, open_gyroscope};

/// Record samples until interrupted, the sample limit is reached or a
/// sensor fails
pub async fn handle_record(config: RecorderConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let accelerometer = open_accelerometer(&config)?;
    let mut reader = SensorReader::new(Box::new(accelerometer))
        .with_schedule(config.schedule.build())
        .with_max_samples(config.max_samples);
    if let Some(gyroscope) = open_gyroscope(&config)? {
        reader = reader.with_source(Box::new(gyroscope));
    }
    if let Some(compass) = open_compass(&config)? {
        reader = reader.with_source(Box::new(compass));
    }

    let stop = StopSignal::new();
    let sink = Sink::new(&config.sink, stop.clone())?;
    let client = sink.client();

    // Consumer and producer each get their own blocking thread
    let drain = tokio::task::spawn_blocking(move || sink.run());
    let producer = tokio::task::spawn_blocking(move || {
        let result = reader.run(&client);
        drop(client);
        result
    });

    let signal_stop = stop.clone();
    let signal_task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Stopping recording");
                signal_stop.stop();
            }
            Err(e) => log::error!("Unable to listen for shutdown signal: {e}"),
        }
    });

    let read_result = producer.await?;
    signal_task.abort();
    let drain_result = drain.await?;

    let stats = read_result?;
    drain_result?;
    log::info!(
        "Recorded {} samples in {:.1}s (last samples/sec: {})",
        stats.samples_read,
        stats.elapsed.as_secs_f64(),
        stats.samples_per_sec
    );

    Ok(())
}
