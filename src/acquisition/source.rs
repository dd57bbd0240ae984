use crate::drivers::{
    adxl345, hmc5883l, itg3200, transport::RegisterTransport, AxisData, DriverError,
};

use super::sample::SensorKind;

/// A [SensorSource] is a sensor the acquisition loop can poll
pub trait SensorSource: Send {
    /// Returns the kind of sensor samples from this source are tagged with
    fn kind(&self) -> SensorKind;

    /// Prepare the sensor for measuring
    fn start(&mut self) -> Result<(), DriverError>;

    /// Stop measuring
    fn stop(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Read one (x, y, z) sample
    fn read(&mut self) -> Result<AxisData, DriverError>;
}

impl<T: RegisterTransport> SensorSource for adxl345::driver::Driver<T> {
    fn kind(&self) -> SensorKind {
        SensorKind::Accelerometer
    }

    fn start(&mut self) -> Result<(), DriverError> {
        self.power_on()
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.power_off()
    }

    fn read(&mut self) -> Result<AxisData, DriverError> {
        self.read_sample()
    }
}

impl<T: RegisterTransport> SensorSource for itg3200::driver::Driver<T> {
    fn kind(&self) -> SensorKind {
        SensorKind::Gyroscope
    }

    // Measures as soon as the sample rate is configured
    fn start(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn read(&mut self) -> Result<AxisData, DriverError> {
        self.read_sample()
    }
}

impl<T: RegisterTransport> SensorSource for hmc5883l::driver::Driver<T> {
    fn kind(&self) -> SensorKind {
        SensorKind::Compass
    }

    fn start(&mut self) -> Result<(), DriverError> {
        hmc5883l::driver::Driver::start(self)
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        hmc5883l::driver::Driver::stop(self)
    }

    fn read(&mut self) -> Result<AxisData, DriverError> {
        self.read_sample()
    }
}
