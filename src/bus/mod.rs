pub mod i2c;
pub mod sim;

use async_trait::async_trait;
use thiserror::Error;

/// I2C bus error type
#[derive(Error, Debug)]
pub enum BusError {
    #[cfg(target_os = "linux")]
    #[error("I2C transfer failed: {0}")]
    I2c(#[from] i2cdev::linux::LinuxI2CError),

    #[error("device did not acknowledge")]
    Nack,

    #[error("short transfer: expected {expected} byte(s), got {got}")]
    ShortTransfer { expected: usize, got: usize },

    #[error("bus unavailable: {0}")]
    Unavailable(String),
}

/// Raw master send/receive primitives against a single slave device.
///
/// The slave address is bound when the transport is opened, so callers only
/// deal in payload bytes. Start/stop conditions and addressing are handled by
/// the underlying bus. Every transfer returns a result the caller must
/// consult; a failed transfer leaves the destination buffer unspecified.
#[async_trait]
pub trait I2cTransport: Send {
    /// Write `buf` to the slave in one transaction.
    async fn send(&mut self, buf: &[u8]) -> Result<(), BusError>;

    /// Fill `buf` from the slave in one transaction.
    async fn recv(&mut self, buf: &mut [u8]) -> Result<(), BusError>;
}
