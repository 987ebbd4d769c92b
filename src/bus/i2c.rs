use async_trait::async_trait;

use super::{BusError, I2cTransport};

#[cfg(target_os = "linux")]
use i2cdev::core::I2CDevice;
#[cfg(target_os = "linux")]
use i2cdev::linux::LinuxI2CDevice;

/// I2C bus adapter bound to one slave address
#[cfg(target_os = "linux")]
pub struct I2CBus {
    device: LinuxI2CDevice,
}

#[cfg(not(target_os = "linux"))]
pub struct I2CBus {
    _phantom: std::marker::PhantomData<()>,
}

#[cfg(target_os = "linux")]
impl I2CBus {
    /// Opens the adapter at `path` and binds it to the 7-bit `address`.
    pub fn open(path: &str, address: u16) -> Result<Self, BusError> {
        let device = LinuxI2CDevice::new(path, address)?;
        Ok(Self { device })
    }
}

#[cfg(target_os = "linux")]
#[async_trait]
impl I2cTransport for I2CBus {
    async fn send(&mut self, buf: &[u8]) -> Result<(), BusError> {
        self.device.write(buf)?;
        Ok(())
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        self.device.read(buf)?;
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
impl I2CBus {
    pub fn open(_path: &str, _address: u16) -> Result<Self, BusError> {
        Err(BusError::Unavailable(
            "I2C is only supported on Linux".to_string(),
        ))
    }
}

#[cfg(not(target_os = "linux"))]
#[async_trait]
impl I2cTransport for I2CBus {
    async fn send(&mut self, _buf: &[u8]) -> Result<(), BusError> {
        Err(BusError::Unavailable(
            "I2C is only supported on Linux".to_string(),
        ))
    }

    async fn recv(&mut self, _buf: &mut [u8]) -> Result<(), BusError> {
        Err(BusError::Unavailable(
            "I2C is only supported on Linux".to_string(),
        ))
    }
}
