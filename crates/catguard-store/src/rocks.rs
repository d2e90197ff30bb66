//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use catguard_core::SensorId;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::types::{AlarmStatus, ArmingStatus, Sensor};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read a single-byte setting. `None` if it was never written.
    fn get_setting(&self, key: &[u8]) -> Result<Option<u8>> {
        let cf = self.cf(cf::SETTINGS)?;
        let value = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match value.as_deref() {
            None => Ok(None),
            Some([byte]) => Ok(Some(*byte)),
            Some(other) => Err(StoreError::Serialization(format!(
                "expected 1-byte setting, got {} bytes",
                other.len()
            ))),
        }
    }

    fn put_setting(&self, key: &[u8], value: u8) -> Result<()> {
        let cf = self.cf(cf::SETTINGS)?;
        self.db
            .put_cf(&cf, key, [value])
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn sensor_exists(&self, sensor_id: &SensorId) -> Result<bool> {
        let cf = self.cf(cf::SENSORS)?;
        let value = self
            .db
            .get_pinned_cf(&cf, keys::sensor_key(sensor_id))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(value.is_some())
    }

    fn put_sensor(&self, sensor: &Sensor) -> Result<()> {
        let cf = self.cf(cf::SENSORS)?;
        let key = keys::sensor_key(&sensor.sensor_id);
        let value = Self::serialize(sensor)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // System Status
    // =========================================================================

    fn get_arming_status(&self) -> Result<ArmingStatus> {
        match self.get_setting(keys::ARMING_STATUS)? {
            None => Ok(ArmingStatus::default()),
            Some(value) => ArmingStatus::from_u8(value).ok_or(StoreError::CorruptStatus {
                field: "arming_status",
                value,
            }),
        }
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.put_setting(keys::ARMING_STATUS, status.as_u8())
    }

    fn get_alarm_status(&self) -> Result<AlarmStatus> {
        match self.get_setting(keys::ALARM_STATUS)? {
            None => Ok(AlarmStatus::default()),
            Some(value) => AlarmStatus::from_u8(value).ok_or(StoreError::CorruptStatus {
                field: "alarm_status",
                value,
            }),
        }
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.put_setting(keys::ALARM_STATUS, status.as_u8())
    }

    // =========================================================================
    // Sensor Operations
    // =========================================================================

    fn add_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.put_sensor(sensor)?;
        tracing::debug!(sensor_id = %sensor.sensor_id, name = %sensor.name, "Stored sensor");
        Ok(())
    }

    fn remove_sensor(&self, sensor_id: &SensorId) -> Result<()> {
        if !self.sensor_exists(sensor_id)? {
            return Err(StoreError::SensorNotFound(*sensor_id));
        }

        let cf = self.cf(cf::SENSORS)?;
        self.db
            .delete_cf(&cf, keys::sensor_key(sensor_id))
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        if !self.sensor_exists(&sensor.sensor_id)? {
            return Err(StoreError::SensorNotFound(sensor.sensor_id));
        }
        self.put_sensor(sensor)
    }

    fn get_sensor(&self, sensor_id: &SensorId) -> Result<Option<Sensor>> {
        let cf = self.cf(cf::SENSORS)?;
        let key = keys::sensor_key(sensor_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_sensors(&self) -> Result<Vec<Sensor>> {
        let cf = self.cf(cf::SENSORS)?;

        let mut sensors = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let key_id = keys::sensor_id_from_key(&key)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            let sensor: Sensor = Self::deserialize(&value)?;

            if sensor.sensor_id != key_id {
                return Err(StoreError::Serialization(format!(
                    "sensor record under key {key_id} holds id {}",
                    sensor.sensor_id
                )));
            }
            sensors.push(sensor);
        }

        Ok(sensors)
    }
}
