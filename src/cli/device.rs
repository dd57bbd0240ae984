use std::error::Error;

use crate::{
    config::{BusKind, RecorderConfig},
    drivers::{
        adxl345::{self, ALT_ADDRESS, STD_ADDRESS},
        hmc5883l, itg3200,
        transport::{
            i2c::I2cTransport,
            simulated::{Motion, SimulatedAdxl345},
            spi::SpiTransport,
            RegisterTransport, TransportError,
        },
    },
};

pub type Accelerometer = adxl345::driver::Driver<Box<dyn RegisterTransport>>;
pub type Gyroscope = itg3200::driver::Driver<Box<dyn RegisterTransport>>;
pub type Compass = hmc5883l::driver::Driver<Box<dyn RegisterTransport>>;

/// Open the bus the accelerometer is attached to
fn accelerometer_transport(
    config: &RecorderConfig,
) -> Result<Box<dyn RegisterTransport>, TransportError> {
    let bus = &config.bus;
    let transport: Box<dyn RegisterTransport> = match bus.kind {
        BusKind::I2c => {
            let address = if bus.alternate_address {
                ALT_ADDRESS
            } else {
                STD_ADDRESS
            };
            Box::new(I2cTransport::open(&bus.i2c_device, address)?)
        }
        BusKind::Spi => Box::new(SpiTransport::open(&bus.spi_device)?),
        BusKind::Simulated => {
            log::info!("Using simulated accelerometer");
            let simulation = &config.simulation;
            Box::new(
                SimulatedAdxl345::new(Motion::default())
                    .with_noise(simulation.noise, simulation.seed),
            )
        }
    };
    Ok(transport)
}

/// Open the I2C bus for a secondary sensor. Returns None when the
/// accelerometer bus is simulated.
fn i2c_transport(
    config: &RecorderConfig,
    address: u8,
) -> Result<Option<Box<dyn RegisterTransport>>, TransportError> {
    if config.bus.kind == BusKind::Simulated {
        return Ok(None);
    }
    let transport = I2cTransport::open(&config.bus.i2c_device, address)?;
    Ok(Some(Box::new(transport)))
}

/// Open, verify and configure the accelerometer. Measurement is not started.
pub fn open_accelerometer(
    config: &RecorderConfig,
) -> Result<Accelerometer, Box<dyn Error + Send + Sync>> {
    let settings = &config.accelerometer;
    let mut driver = adxl345::driver::Driver::new(accelerometer_transport(config)?);
    driver.verify_device_id()?;
    driver.configure_power_control(settings.power_control.to_register());
    driver.power_off()?;
    driver.configure_range(settings.range_g, settings.full_resolution)?;
    let rate = driver.configure_rate(settings.rate_hz, settings.low_power)?;
    log::info!(
        "Accelerometer configured: +/-{}g, full resolution: {}, {rate}Hz",
        settings.range_g,
        settings.full_resolution
    );
    Ok(driver)
}

/// Open and configure the gyroscope if it is enabled
pub fn open_gyroscope(
    config: &RecorderConfig,
) -> Result<Option<Gyroscope>, Box<dyn Error + Send + Sync>> {
    let settings = &config.gyroscope;
    if !settings.enabled {
        return Ok(None);
    }
    let Some(transport) = i2c_transport(config, itg3200::ADDRESS)? else {
        log::warn!("Gyroscope is not available on a simulated bus");
        return Ok(None);
    };
    let mut driver = itg3200::driver::Driver::new(transport);
    driver.configure_sample_rate(settings.low_pass_filter, settings.sample_rate_divider)?;
    log::info!("Gyroscope configured");
    Ok(Some(driver))
}

/// Open the compass if it is enabled and present
pub fn open_compass(
    config: &RecorderConfig,
) -> Result<Option<Compass>, Box<dyn Error + Send + Sync>> {
    if !config.compass.enabled {
        return Ok(None);
    }
    let Some(transport) = i2c_transport(config, hmc5883l::ADDRESS)? else {
        log::warn!("Compass is not available on a simulated bus");
        return Ok(None);
    };
    let mut driver = hmc5883l::driver::Driver::new(transport);
    if !driver.is_present()? {
        return Err("Compass did not identify as HMC5883L".into());
    }
    Ok(Some(driver))
}

/// Print the identity of each sensor and the effective configuration
pub fn handle_info(config: &RecorderConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut accelerometer = open_accelerometer(config)?;
    println!("Accelerometer: ADXL345 (id {:#04x})", accelerometer.device_id()?);
    let settings = accelerometer.configuration();
    println!("  Range: +/-{}g", settings.range.g());
    println!("  Full resolution: {}", settings.full_resolution);
    println!("  Data rate: {}Hz", settings.rate.hz());
    println!("  Low power: {}", settings.low_power);

    if let Some(mut gyroscope) = open_gyroscope(config)? {
        println!("Gyroscope: ITG3200 (id {:#04x})", gyroscope.device_id()?);
    }
    if open_compass(config)?.is_some() {
        println!("Compass: HMC5883L");
    }

    println!();
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
