//! Process-local, unpersisted memory of which hardware models have been
//! observed at least once. Rebuilt from scratch on every restart.

use std::collections::HashMap;

use sm_types::SensorDescriptor;

/// `hardware_model -> last-seen descriptor`. Exposes `mark_known` and
/// `is_known` as distinct operations (rather than folding marking into a
/// single "reconcile" call) so that a future caller can choose to mark a
/// sensor known only *after* a successful reconciliation without
/// touching the loop's control flow — see the crate-level design notes
/// on why a sensor is still marked known before reconciliation is
/// attempted, so a failure is never retried.
#[derive(Debug, Default)]
pub struct KnownSensors {
    seen: HashMap<String, SensorDescriptor>,
}

impl KnownSensors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known(&self, hardware_model: &str) -> bool {
        self.seen.contains_key(hardware_model)
    }

    pub fn mark_known(&mut self, sensor: SensorDescriptor) {
        self.seen.insert(sensor.hardware_model.clone(), sensor);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
