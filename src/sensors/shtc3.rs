//! Sensirion SHTC3 command layer.
//!
//! The sensor speaks fixed 16-bit command codes over I2C. A measurement is a
//! single-shot cycle: write the measure command, wait out the conversion
//! time, then read back a fixed-length reply and decode the leading word.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::bus::{BusError, I2cTransport};
use crate::errors::{SensorError, SensorResult};

/// Conversion time for a normal-mode measurement.
pub const MEASURE_DELAY: Duration = Duration::from_millis(20);

/// Wake-up settling time after leaving sleep mode.
pub const WAKEUP_DELAY: Duration = Duration::from_millis(1);

/// Bits of the ID register that identify the part.
pub const ID_MASK: u16 = 0x083F;
/// ID register pattern for an SHTC3.
pub const ID_SHTC3: u16 = 0x0807;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Normal,
    LowPower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStretch {
    Enabled,
    Disabled,
}

/// Which word leads the measurement reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Temperature,
    Humidity,
}

/// The SHTC3 command surface (datasheet tables 5-10, 14-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    WakeUp,
    Sleep,
    Measure(PowerMode, ClockStretch, Channel),
    SoftReset,
    ReadId,
}

impl Command {
    pub fn code(&self) -> u16 {
        use Channel::*;
        use ClockStretch::*;
        use PowerMode::*;
        match *self {
            Command::WakeUp => 0x3517,
            Command::Sleep => 0xB098,
            Command::Measure(Normal, Enabled, Temperature) => 0x7CA2,
            Command::Measure(Normal, Enabled, Humidity) => 0x5C24,
            Command::Measure(Normal, Disabled, Temperature) => 0x7866,
            Command::Measure(Normal, Disabled, Humidity) => 0x58E0,
            Command::Measure(LowPower, Enabled, Temperature) => 0x6458,
            Command::Measure(LowPower, Enabled, Humidity) => 0x44DE,
            Command::Measure(LowPower, Disabled, Temperature) => 0x609C,
            Command::Measure(LowPower, Disabled, Humidity) => 0x401A,
            Command::SoftReset => 0x805D,
            Command::ReadId => 0xEFC8,
        }
    }

    /// Wire encoding: command code, big-endian.
    pub fn bytes(&self) -> [u8; 2] {
        self.code().to_be_bytes()
    }
}

/// SHTC3 driver over a raw transport bound to the sensor's slave address.
pub struct Shtc3<T> {
    bus: T,
    measure_delay: Duration,
}

impl<T: I2cTransport> Shtc3<T> {
    pub fn new(bus: T) -> Self {
        Self {
            bus,
            measure_delay: MEASURE_DELAY,
        }
    }

    /// Override the fixed conversion wait.
    pub fn with_measure_delay(mut self, delay: Duration) -> Self {
        self.measure_delay = delay;
        self
    }

    async fn command(&mut self, cmd: Command) -> Result<(), BusError> {
        debug!("[shtc3] command {:?} ({:#06x})", cmd, cmd.code());
        self.bus.send(&cmd.bytes()).await
    }

    pub async fn wake_up(&mut self) -> SensorResult<()> {
        self.command(Command::WakeUp).await?;
        sleep(WAKEUP_DELAY).await;
        Ok(())
    }

    pub async fn sleep(&mut self) -> SensorResult<()> {
        self.command(Command::Sleep).await?;
        Ok(())
    }

    pub async fn soft_reset(&mut self) -> SensorResult<()> {
        self.command(Command::SoftReset).await?;
        sleep(WAKEUP_DELAY).await;
        Ok(())
    }

    /// Read the 16-bit ID register.
    pub async fn read_id(&mut self) -> SensorResult<u16> {
        self.command(Command::ReadId).await?;
        let mut buf = [0u8; 3];
        self.bus.recv(&mut buf).await?;
        Ok(u16::from_be_bytes([buf[0], buf[1]]))
    }

    /// Read the ID register and check it carries the SHTC3 part pattern.
    pub async fn verify_id(&mut self) -> SensorResult<u16> {
        let id = self.read_id().await?;
        if id & ID_MASK != ID_SHTC3 {
            return Err(SensorError::WrongChipId {
                expected: ID_SHTC3,
                actual: id,
            });
        }
        Ok(id)
    }

    /// One single-shot temperature measurement, normal mode, clock stretching
    /// disabled. Returns the raw 16-bit sensor word.
    ///
    /// The reply carries a third CRC byte which is read but not checked.
    pub async fn measure_raw(&mut self) -> SensorResult<u16> {
        self.command(Command::Measure(
            PowerMode::Normal,
            ClockStretch::Disabled,
            Channel::Temperature,
        ))
        .await?;
        sleep(self.measure_delay).await;

        let mut buf = [0u8; 3];
        self.bus.recv(&mut buf).await?;
        Ok(u16::from_be_bytes([buf[0], buf[1]]))
    }

    pub fn release(self) -> T {
        self.bus
    }
}
