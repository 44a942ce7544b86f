//! Simulated supervisor: streams acceleration telemetry to the robot and
//! collects the labels it sends back.

use std::cell::RefCell;
use std::rc::Rc;

use rover_config::{CaptureRow, Delivery};
use rover_core::Triple;
use rover_core::protocol::{decode_label, encode_batch, encode_single};
use rover_hardware::Peer;
use rover_hardware::radio::{Emitter, Receiver};
use rover_traits::TelemetryReceiver;

/// Where readings come from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Replay a capture once, in order.
    Capture(Vec<Triple>),
    /// Endless vibration signal cycling through three intensity levels.
    Synthetic { amplitude: f32 },
}

impl Source {
    pub fn from_rows(rows: &[CaptureRow]) -> Self {
        Self::Capture(rows.iter().map(|r| Triple::new(r.x, r.y, r.z)).collect())
    }

    fn reading(&self, index: u64) -> Option<Triple> {
        match self {
            Self::Capture(rows) => usize::try_from(index).ok().and_then(|i| rows.get(i)).copied(),
            Self::Synthetic { amplitude } => Some(synthetic(*amplitude, index)),
        }
    }
}

/// Ticks spent at each intensity level of the synthetic signal.
const SEGMENT_TICKS: u64 = 240;
const LEVELS: [f32; 3] = [0.1, 0.6, 1.6];

#[allow(clippy::cast_precision_loss)]
fn synthetic(amplitude: f32, index: u64) -> Triple {
    let segment = usize::try_from((index / SEGMENT_TICKS) % 3).unwrap_or(0);
    let level = amplitude * LEVELS[segment];
    let phase = index as f32 * 0.35;
    Triple::new(
        level * phase.sin(),
        level * 0.5 * (2.0 * phase + 1.0).sin(),
        level * 0.3 * (3.0 * phase).cos(),
    )
}

#[derive(Debug, Default)]
struct Inbox {
    labels: Vec<i32>,
    sent: u64,
    dropped: u64,
    garbled: u64,
}

/// Read-only view of what the supervisor has seen, usable after the world
/// has taken ownership of the supervisor.
#[derive(Clone)]
pub struct SupervisorProbe {
    inbox: Rc<RefCell<Inbox>>,
    uplink: Rc<RefCell<Receiver>>,
}

impl SupervisorProbe {
    /// Pull any labels still in flight.
    pub fn drain(&self) {
        drain_into(&mut self.uplink.borrow_mut(), &mut self.inbox.borrow_mut(), None);
    }

    pub fn labels(&self) -> Vec<i32> {
        self.inbox.borrow().labels.clone()
    }

    /// Telemetry messages handed to the radio.
    pub fn sent(&self) -> u64 {
        self.inbox.borrow().sent
    }

    /// Telemetry messages the radio refused.
    pub fn dropped(&self) -> u64 {
        self.inbox.borrow().dropped
    }

    /// Uplink packets that did not decode as a label.
    pub fn garbled(&self) -> u64 {
        self.inbox.borrow().garbled
    }
}

fn drain_into(uplink: &mut Receiver, inbox: &mut Inbox, tick: Option<u64>) {
    while let Some(packet) = uplink.next_packet() {
        match decode_label(&packet) {
            Ok(label) => {
                tracing::debug!(?tick, label, "label received");
                inbox.labels.push(label);
            }
            Err(e) => {
                inbox.garbled += 1;
                tracing::warn!(?tick, error = %e, "unreadable label packet");
            }
        }
    }
}

pub struct Supervisor {
    downlink: Emitter,
    uplink: Rc<RefCell<Receiver>>,
    inbox: Rc<RefCell<Inbox>>,
    source: Source,
    delivery: Delivery,
    window_len: usize,
    batch: Vec<Triple>,
    cursor: u64,
    exhausted: bool,
}

impl Supervisor {
    pub fn new(
        downlink: Emitter,
        uplink: Receiver,
        source: Source,
        delivery: Delivery,
        window_len: usize,
    ) -> Self {
        Self {
            downlink,
            uplink: Rc::new(RefCell::new(uplink)),
            inbox: Rc::default(),
            source,
            delivery,
            window_len: window_len.max(1),
            batch: Vec::with_capacity(window_len),
            cursor: 0,
            exhausted: false,
        }
    }

    pub fn probe(&self) -> SupervisorProbe {
        SupervisorProbe {
            inbox: Rc::clone(&self.inbox),
            uplink: Rc::clone(&self.uplink),
        }
    }

    fn transmit(&self, text: &str, tick: u64) {
        let mut inbox = self.inbox.borrow_mut();
        match self.downlink.transmit(text.as_bytes()) {
            Ok(()) => inbox.sent += 1,
            Err(e) => {
                inbox.dropped += 1;
                tracing::warn!(tick, error = %e, "telemetry not sent");
            }
        }
    }
}

impl Peer for Supervisor {
    fn on_step(&mut self, tick: u64) {
        drain_into(
            &mut self.uplink.borrow_mut(),
            &mut self.inbox.borrow_mut(),
            Some(tick),
        );

        let Some(reading) = self.source.reading(self.cursor) else {
            if !self.exhausted {
                self.exhausted = true;
                tracing::info!(tick, readings = self.cursor, "capture exhausted");
            }
            return;
        };
        self.cursor += 1;

        match self.delivery {
            Delivery::Single => self.transmit(&encode_single(&reading), tick),
            Delivery::Batch => {
                self.batch.push(reading);
                if self.batch.len() == self.window_len {
                    let text = encode_batch(&self.batch);
                    self.batch.clear();
                    self.transmit(&text, tick);
                }
            }
        }
    }
}
