//! End-to-end exercise of the device node against a simulated bus.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use drvshtc::bus::sim::SimBus;
use drvshtc::bus::BusError;
use drvshtc::device::DeviceContext;
use drvshtc::node::{self, REQ_READ, STATUS_BAD_REQUEST, STATUS_BUS_FAULT, STATUS_OK};
use drvshtc::sensors::Shtc3;

fn scratch_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("drvshtc-it-{}-{}", tag, std::process::id()))
}

async fn request(stream: &mut UnixStream, op: u8) -> [u8; 3] {
    stream.write_all(&[op]).await.unwrap();
    let mut reply = [0u8; 3];
    stream.read_exact(&mut reply).await.unwrap();
    reply
}

#[tokio::test]
async fn read_cycle_over_the_node() {
    let path = scratch_dir("roundtrip").join("drvSHTC.sock");

    // First read succeeds, second hits a NACK, then the bus settles on a
    // fixed frame.
    let mut bus = SimBus::with_frame(&[0x65, 0x00, 0xCD]);
    bus.push_frame(&[0x64, 0x00, 0xAB]);
    bus.push_fault(BusError::Nack);
    let ctx = Arc::new(DeviceContext::new(
        Shtc3::new(bus).with_measure_delay(Duration::ZERO),
    ));

    let registration = node::register(&path).unwrap();
    let server = tokio::spawn({
        let ctx = ctx.clone();
        async move {
            node::serve(&registration, ctx).await;
        }
    });

    let mut stream = UnixStream::connect(&path).await.unwrap();

    assert_eq!(request(&mut stream, REQ_READ).await, [STATUS_OK, 0x64, 0x00]);

    // The fault reaches the consumer as a status, not as stale data.
    assert_eq!(request(&mut stream, REQ_READ).await, [STATUS_BUS_FAULT, 0, 0]);

    assert_eq!(request(&mut stream, REQ_READ).await, [STATUS_OK, 0x65, 0x00]);
    assert_eq!(ctx.last_sample().await, Some(0x6500));

    assert_eq!(
        request(&mut stream, 0x7F).await,
        [STATUS_BAD_REQUEST, 0, 0]
    );

    drop(stream);

    // Tearing the server down unregisters the node exactly once.
    server.abort();
    assert!(server.await.unwrap_err().is_cancelled());
    assert!(!path.exists());
}

#[tokio::test]
async fn concurrent_opens_are_all_served() {
    let path = scratch_dir("concurrent").join("drvSHTC.sock");

    let ctx = Arc::new(DeviceContext::new(
        Shtc3::new(SimBus::with_frame(&[0x64, 0x00, 0xAB])).with_measure_delay(Duration::ZERO),
    ));

    let registration = node::register(&path).unwrap();
    let server = tokio::spawn({
        let ctx = ctx.clone();
        async move {
            node::serve(&registration, ctx).await;
        }
    });

    let mut clients = Vec::new();
    for _ in 0..2 {
        clients.push(UnixStream::connect(&path).await.unwrap());
    }

    for stream in clients.iter_mut() {
        assert_eq!(request(stream, REQ_READ).await, [STATUS_OK, 0x64, 0x00]);
    }

    drop(clients);
    server.abort();
    let _ = server.await;
    assert!(!path.exists());
}
