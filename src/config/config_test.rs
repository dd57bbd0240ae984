use std::{
    error::Error,
    io::Write,
    path::{Path, PathBuf},
};

use packed_struct::PackedStruct;

use crate::{acquisition::schedule::ScheduleKind, config::*};

const EXAMPLE_CONFIG: &str = "./rootfs/etc/imurecorder/config.yaml";

#[test]
fn test_empty_config_uses_defaults() -> Result<(), Box<dyn Error>> {
    let config = RecorderConfig::from_yaml("{}")?;
    assert_eq!(config, RecorderConfig::default());
    assert_eq!(config.bus.kind, BusKind::I2c);
    assert!(config.bus.alternate_address);
    assert_eq!(config.accelerometer.rate_hz, 800.0);
    assert_eq!(config.accelerometer.range_g, 16);
    assert!(config.accelerometer.full_resolution);
    assert_eq!(config.sink.kind, SinkKind::File);
    assert_eq!(
        config.sink.directory,
        PathBuf::from("/home/pi/sensor_recordings")
    );
    assert_eq!(config.sink.keep_every_nth, 1);
    assert_eq!(config.schedule, ScheduleKind::AccelerometerOnly);
    assert_eq!(config.max_samples, None);
    Ok(())
}

#[test]
fn test_partial_config() -> Result<(), Box<dyn Error>> {
    let content = r#"
bus:
  kind: simulated
accelerometer:
  rate_hz: 100
  power_control:
    link: true
    wake_up: 2
schedule: interleaved
sink:
  kind: console
  keep_every_nth: 10
max_samples: 500
"#;
    let config = RecorderConfig::from_yaml(content)?;
    assert_eq!(config.bus.kind, BusKind::Simulated);
    assert_eq!(config.bus.i2c_device, "/dev/i2c-1");
    assert_eq!(config.accelerometer.rate_hz, 100.0);
    assert_eq!(config.accelerometer.range_g, 16);
    assert_eq!(config.schedule, ScheduleKind::Interleaved);
    assert_eq!(config.sink.kind, SinkKind::Console);
    assert_eq!(config.sink.keep_every_nth, 10);
    assert_eq!(config.max_samples, Some(500));

    let power = config.accelerometer.power_control.to_register();
    assert!(!power.measure);
    assert_eq!(power.pack()?, [0x22]);
    Ok(())
}

#[test]
fn test_unknown_variant_is_rejected() {
    let result = RecorderConfig::from_yaml("bus:\n  kind: usb\n");
    assert!(matches!(result, Err(LoadError::DeserializeError(_))));
}

#[test]
fn test_example_config_loads() -> Result<(), Box<dyn Error>> {
    let config = RecorderConfig::from_yaml_file(Path::new(EXAMPLE_CONFIG))?;
    assert_eq!(config.accelerometer, AccelerometerConfig::default());
    Ok(())
}

#[test]
fn test_load_explicit_path() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "compass:\n  enabled: true")?;
    let config = RecorderConfig::load(Some(file.path()))?;
    assert!(config.compass.enabled);

    let missing = file.path().with_extension("missing");
    assert!(matches!(
        RecorderConfig::load(Some(missing.as_path())),
        Err(LoadError::IoError(_))
    ));
    Ok(())
}
