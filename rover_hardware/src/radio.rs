//! Simulated radio: a bounded, lossy, one-directional packet link.
//!
//! Two links make a full-duplex pair, one for telemetry going to the robot
//! and one for labels coming back. Sends never block; a full queue drops the
//! packet and reports `HwError::QueueFull`, like a real radio with a finite
//! receive buffer.
use crossbeam_channel as xch;
use rover_traits::{LabelEmitter, TelemetryReceiver};

use crate::error::HwError;

/// Create a link that holds at most `capacity` undelivered packets.
pub fn link(capacity: usize) -> (Emitter, Receiver) {
    let capacity = capacity.max(1);
    let (tx, rx) = xch::bounded(capacity);
    (Emitter { tx, capacity }, Receiver { rx })
}

#[derive(Clone)]
pub struct Emitter {
    tx: xch::Sender<Vec<u8>>,
    capacity: usize,
}

impl Emitter {
    pub fn transmit(&self, payload: &[u8]) -> crate::error::Result<()> {
        match self.tx.try_send(payload.to_vec()) {
            Ok(()) => Ok(()),
            Err(xch::TrySendError::Full(_)) => Err(HwError::QueueFull(self.capacity)),
            Err(xch::TrySendError::Disconnected(_)) => Err(HwError::LinkClosed),
        }
    }
}

impl LabelEmitter for Emitter {
    fn send(&mut self, payload: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.transmit(payload).map_err(Into::into)
    }
}

pub struct Receiver {
    rx: xch::Receiver<Vec<u8>>,
}

impl Receiver {
    /// Packets waiting to be read.
    pub fn queue_len(&self) -> usize {
        self.rx.len()
    }
}

impl TelemetryReceiver for Receiver {
    fn next_packet(&mut self) -> Option<Vec<u8>> {
        self.rx.try_recv().ok()
    }
}
