//! In-memory storage implementation.
//!
//! Useful for tests and for running the controller without a data directory.
//! Nothing survives the process.

use catguard_core::SensorId;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::types::{AlarmStatus, ArmingStatus, Sensor};
use crate::Store;

#[derive(Debug, Default)]
struct State {
    arming_status: ArmingStatus,
    alarm_status: AlarmStatus,
    sensors: Vec<Sensor>,
}

/// In-memory `Store` backed by a lock-protected state block.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store (disarmed, no alarm, no sensors).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with sensors.
    #[must_use]
    pub fn with_sensors(sensors: impl IntoIterator<Item = Sensor>) -> Self {
        let store = Self::new();
        store.state.write().sensors.extend(sensors);
        store
    }
}

impl Store for MemoryStore {
    fn get_arming_status(&self) -> Result<ArmingStatus> {
        Ok(self.state.read().arming_status)
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.state.write().arming_status = status;
        Ok(())
    }

    fn get_alarm_status(&self) -> Result<AlarmStatus> {
        Ok(self.state.read().alarm_status)
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.state.write().alarm_status = status;
        Ok(())
    }

    fn add_sensor(&self, sensor: &Sensor) -> Result<()> {
        let mut state = self.state.write();
        let position = state
            .sensors
            .iter()
            .position(|s| s.sensor_id == sensor.sensor_id);
        match position {
            Some(index) => state.sensors[index].clone_from(sensor),
            None => state.sensors.push(sensor.clone()),
        }
        Ok(())
    }

    fn remove_sensor(&self, sensor_id: &SensorId) -> Result<()> {
        let mut state = self.state.write();
        let index = state
            .sensors
            .iter()
            .position(|s| s.sensor_id == *sensor_id)
            .ok_or(StoreError::SensorNotFound(*sensor_id))?;
        state.sensors.remove(index);
        Ok(())
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        let mut state = self.state.write();
        let existing = state
            .sensors
            .iter_mut()
            .find(|s| s.sensor_id == sensor.sensor_id)
            .ok_or(StoreError::SensorNotFound(sensor.sensor_id))?;
        existing.clone_from(sensor);
        Ok(())
    }

    fn get_sensor(&self, sensor_id: &SensorId) -> Result<Option<Sensor>> {
        Ok(self
            .state
            .read()
            .sensors
            .iter()
            .find(|s| s.sensor_id == *sensor_id)
            .cloned())
    }

    fn list_sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.state.read().sensors.clone())
    }
}
