//! Scripted in-memory bus for tests and for running the daemon off-target.

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{BusError, I2cTransport};

enum Reply {
    Frame(Vec<u8>),
    Fault(BusError),
}

/// Simulated slave device.
///
/// Replies are served from a queue; once the queue is drained the fallback
/// frame (if any) repeats forever, which models a sensor whose state is not
/// changing between reads. Writes are recorded for inspection.
#[derive(Default)]
pub struct SimBus {
    written: Vec<Vec<u8>>,
    queue: VecDeque<Reply>,
    fallback: Option<Vec<u8>>,
    nack_writes: bool,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus that answers every receive with the same frame.
    pub fn with_frame(frame: &[u8]) -> Self {
        let mut bus = Self::new();
        bus.fallback = Some(frame.to_vec());
        bus
    }

    /// Queue one reply frame.
    pub fn push_frame(&mut self, frame: &[u8]) {
        self.queue.push_back(Reply::Frame(frame.to_vec()));
    }

    /// Queue one receive fault.
    pub fn push_fault(&mut self, fault: BusError) {
        self.queue.push_back(Reply::Fault(fault));
    }

    /// Make every subsequent write fail with a NACK.
    pub fn nack_writes(&mut self) {
        self.nack_writes = true;
    }

    /// All frames written to the bus so far, oldest first.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }
}

#[async_trait]
impl I2cTransport for SimBus {
    async fn send(&mut self, buf: &[u8]) -> Result<(), BusError> {
        if self.nack_writes {
            return Err(BusError::Nack);
        }
        self.written.push(buf.to_vec());
        Ok(())
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        let frame = match self.queue.pop_front() {
            Some(Reply::Frame(frame)) => frame,
            Some(Reply::Fault(fault)) => return Err(fault),
            None => match &self.fallback {
                Some(frame) => frame.clone(),
                None => return Err(BusError::Nack),
            },
        };
        if frame.len() != buf.len() {
            return Err(BusError::ShortTransfer {
                expected: buf.len(),
                got: frame.len(),
            });
        }
        buf.copy_from_slice(&frame);
        Ok(())
    }
}
