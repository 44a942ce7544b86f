use rover_traits::ProximitySensors;

use crate::types::ProximityReading;

/// Samples the proximity array once per tick.
pub struct ProximitySensing {
    sensors: Box<dyn ProximitySensors>,
}

impl ProximitySensing {
    pub fn new(sensors: Box<dyn ProximitySensors>) -> Self {
        Self { sensors }
    }

    /// Current values, sanitized to non-negative finite numbers.
    pub fn read(&mut self) -> ProximityReading {
        ProximityReading::from_raw(self.sensors.read())
    }
}

impl std::fmt::Debug for ProximitySensing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProximitySensing").finish_non_exhaustive()
    }
}
