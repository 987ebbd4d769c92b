//! Device bring-up: the load-time sequence that attaches the sensor.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::bus::i2c::I2CBus;
use crate::config::DeviceConfig;
use crate::device::DeviceContext;
use crate::errors::SensorResult;
use crate::sensors::Shtc3;

/// Opens the configured bus adapter, probes the sensor and builds the shared
/// device context.
///
/// Probing is real here: the sensor is woken and its ID register checked for
/// the SHTC3 part pattern, so a wrong address or a dead bus aborts bring-up
/// instead of surfacing later as garbage reads.
pub async fn init_device(cfg: &DeviceConfig) -> SensorResult<Arc<DeviceContext<I2CBus>>> {
    let bus = I2CBus::open(&cfg.bus.path, cfg.sensor.address)?;
    info!(
        "[registry] adapter {} opened, slave address {:#04x}",
        cfg.bus.path, cfg.sensor.address
    );

    let mut sensor =
        Shtc3::new(bus).with_measure_delay(Duration::from_millis(cfg.sensor.measure_delay_ms));
    sensor.wake_up().await?;
    let id = sensor.verify_id().await?;
    info!("[registry] SHTC3 probed, id register {:#06x}", id);

    Ok(Arc::new(DeviceContext::new(sensor)))
}
