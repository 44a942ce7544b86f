//! Lock-step simulated world: the single owner of simulated time.
use rover_traits::{Clock, Scheduler, Tick};
use std::time::Duration;

use crate::ProximityField;

/// Anything else that lives in the world and acts once per step, such as a
/// supervisor streaming telemetry.
pub trait Peer {
    fn on_step(&mut self, tick: u64);
}

pub struct SimWorld {
    field: ProximityField,
    peers: Vec<Box<dyn Peer>>,
    max_ticks: Option<u64>,
    pacing: Option<Box<dyn Clock>>,
    tick: u64,
}

impl SimWorld {
    /// A world that ends after `max_ticks` steps (`None` runs until shutdown
    /// is requested some other way).
    pub fn new(field: ProximityField, max_ticks: Option<u64>) -> Self {
        Self {
            field,
            peers: Vec::new(),
            max_ticks,
            pacing: None,
            tick: 0,
        }
    }

    pub fn with_peer(mut self, peer: impl Peer + 'static) -> Self {
        self.peers.push(Box::new(peer));
        self
    }

    /// Block for one time step per `step()` call, so simulated time tracks
    /// wall-clock time.
    pub fn realtime(mut self, clock: impl Clock + 'static) -> Self {
        self.pacing = Some(Box::new(clock));
        self
    }

    /// Steps completed so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }
}

impl Scheduler for SimWorld {
    fn step(&mut self, time_step: Duration) -> Tick {
        if self.max_ticks.is_some_and(|max| self.tick >= max) {
            tracing::debug!(ticks = self.tick, "simulation end");
            return Tick::Shutdown;
        }
        if let Some(clock) = &self.pacing {
            clock.sleep(time_step);
        }
        self.tick += 1;
        self.field.advance();
        for peer in &mut self.peers {
            peer.on_step(self.tick);
        }
        Tick::Advanced
    }
}
