// Adapters layer: concrete implementations for external systems. The only
// external system here is the Linux userspace I2C interface (/dev/i2c-*).

use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;

use crate::domain::ports::SensorBus;
use crate::utils::error::Result;

/// One sensor endpoint on a Linux I2C bus.
pub struct LinuxI2cBus {
    device: LinuxI2CDevice,
}

impl LinuxI2cBus {
    pub fn open(bus_path: &str, address: u16) -> Result<Self> {
        let device = LinuxI2CDevice::new(bus_path, address)?;
        Ok(Self { device })
    }
}

impl SensorBus for LinuxI2cBus {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.device.write(bytes)?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.device.read(buf)?;
        Ok(())
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.device.smbus_write_byte_data(register, value)?;
        Ok(())
    }
}
