//! In-memory sensor registry.
//!
//! Maps sensor IDs to records and iterates in insertion order.

use std::collections::HashMap;

use catguard_core::SensorId;
use catguard_store::Sensor;

/// Sensors tracked by the controller, keyed by ID.
#[derive(Debug, Default, Clone)]
pub struct SensorRegistry {
    order: Vec<SensorId>,
    sensors: HashMap<SensorId, Sensor>,
}

impl SensorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a sensor. A replaced sensor keeps its position.
    pub fn insert(&mut self, sensor: Sensor) -> Option<Sensor> {
        let sensor_id = sensor.sensor_id;
        let previous = self.sensors.insert(sensor_id, sensor);
        if previous.is_none() {
            self.order.push(sensor_id);
        }
        previous
    }

    /// Remove a sensor.
    pub fn remove(&mut self, sensor_id: &SensorId) -> Option<Sensor> {
        let removed = self.sensors.remove(sensor_id)?;
        self.order.retain(|id| id != sensor_id);
        Some(removed)
    }

    /// Look up a sensor.
    #[must_use]
    pub fn get(&self, sensor_id: &SensorId) -> Option<&Sensor> {
        self.sensors.get(sensor_id)
    }

    /// Look up a sensor for modification.
    pub fn get_mut(&mut self, sensor_id: &SensorId) -> Option<&mut Sensor> {
        self.sensors.get_mut(sensor_id)
    }

    /// Check whether a sensor is tracked.
    #[must_use]
    pub fn contains(&self, sensor_id: &SensorId) -> bool {
        self.sensors.contains_key(sensor_id)
    }

    /// Iterate over sensors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Sensor> {
        self.order.iter().filter_map(|id| self.sensors.get(id))
    }

    /// IDs in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<SensorId> {
        self.order.clone()
    }

    /// Sensors that are currently active.
    pub fn active(&self) -> impl Iterator<Item = &Sensor> {
        self.iter().filter(|s| s.active)
    }

    /// Returns true if at least one sensor is active.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.sensors.values().any(|s| s.active)
    }

    /// Number of tracked sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no sensor is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<Sensor> for SensorRegistry {
    fn from_iter<I: IntoIterator<Item = Sensor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for sensor in iter {
            registry.insert(sensor);
        }
        registry
    }
}
