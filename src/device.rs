//! Device context: the open/read/release surface behind the node.

use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::Mutex;
use tracing::info;

use crate::bus::I2cTransport;
use crate::errors::SensorResult;
use crate::sensors::Shtc3;

/// Shared state for the one sensor device this daemon exposes.
///
/// The sensor sits behind an async mutex, so concurrent readers serialize on
/// the bus instead of racing. The last sample lives in its own cell and is
/// only overwritten by a successful cycle; a bus fault propagates to the
/// caller and never substitutes stale data.
pub struct DeviceContext<T> {
    sensor: Mutex<Shtc3<T>>,
    last_sample: Mutex<Option<u16>>,
    // Diagnostic only: counts opens, never decremented, never enforced.
    opens: AtomicU32,
}

impl<T: I2cTransport> DeviceContext<T> {
    pub fn new(sensor: Shtc3<T>) -> Self {
        Self {
            sensor: Mutex::new(sensor),
            last_sample: Mutex::new(None),
            opens: AtomicU32::new(0),
        }
    }

    /// Registers an open. Concurrent opens are all permitted.
    pub fn open(&self) -> u32 {
        let n = self.opens.fetch_add(1, Ordering::Relaxed) + 1;
        info!("[device] opened {} time(s)", n);
        n
    }

    /// One full command/read cycle. Blocks the caller for the conversion
    /// time (20 ms by default).
    pub async fn read_raw(&self) -> SensorResult<u16> {
        let raw = {
            let mut sensor = self.sensor.lock().await;
            sensor.measure_raw().await?
        };
        *self.last_sample.lock().await = Some(raw);
        Ok(raw)
    }

    /// Most recent successfully read sample, if any.
    pub async fn last_sample(&self) -> Option<u16> {
        *self.last_sample.lock().await
    }

    pub fn release(&self) {
        info!("[device] closed");
    }

    pub fn open_count(&self) -> u32 {
        self.opens.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::bus::sim::SimBus;
    use crate::bus::BusError;

    fn context(bus: SimBus) -> DeviceContext<SimBus> {
        DeviceContext::new(Shtc3::new(bus).with_measure_delay(Duration::ZERO))
    }

    #[tokio::test]
    async fn repeated_reads_are_idempotent_on_static_bus() {
        let ctx = context(SimBus::with_frame(&[0x64, 0x00, 0xAB]));
        for _ in 0..3 {
            assert_eq!(ctx.read_raw().await.unwrap(), 0x6400);
        }
        assert_eq!(ctx.last_sample().await, Some(0x6400));
    }

    #[tokio::test]
    async fn open_release_does_not_touch_sample() {
        let ctx = context(SimBus::with_frame(&[0x64, 0x00, 0xAB]));
        ctx.read_raw().await.unwrap();

        ctx.open();
        ctx.release();
        assert_eq!(ctx.last_sample().await, Some(0x6400));
        assert_eq!(ctx.open_count(), 1);
    }

    #[tokio::test]
    async fn fault_leaves_last_sample_intact() {
        let mut bus = SimBus::new();
        bus.push_frame(&[0x64, 0x00, 0xAB]);
        bus.push_fault(BusError::Nack);
        let ctx = context(bus);

        assert_eq!(ctx.read_raw().await.unwrap(), 0x6400);
        assert!(ctx.read_raw().await.is_err());
        assert_eq!(ctx.last_sample().await, Some(0x6400));
    }

    #[tokio::test]
    async fn concurrent_reads_observe_some_scripted_response() {
        let mut bus = SimBus::new();
        bus.push_frame(&[0x64, 0x00, 0xAB]);
        bus.push_frame(&[0x65, 0x00, 0xCD]);
        let ctx = Arc::new(context(bus));

        let a = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.read_raw().await.unwrap() }
        });
        let b = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.read_raw().await.unwrap() }
        });

        let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
        let mut got = [ra, rb];
        got.sort_unstable();
        assert_eq!(got, [0x6400, 0x6500]);
    }
}
