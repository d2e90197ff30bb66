//! Storage layer for catguard.
//!
//! This crate is the durable source of truth for the security system: the
//! arming status, the alarm status, and the set of registered sensors. The
//! controller reads and writes all three through the [`Store`] trait.
//!
//! # Backends
//!
//! - [`RocksStore`]: persistent storage using `RocksDB` column families
//!   (`sensors`, `settings`), values encoded as CBOR.
//! - [`MemoryStore`]: in-process storage for tests and ephemeral runs.
//!
//! A store that has never been written reports [`ArmingStatus::Disarmed`] and
//! [`AlarmStatus::NoAlarm`].
//!
//! # Example
//!
//! ```no_run
//! use catguard_store::{RocksStore, Sensor, SensorType, Store};
//!
//! let store = RocksStore::open("/tmp/catguard-db").unwrap();
//!
//! store.add_sensor(&Sensor::new("Front Door", SensorType::Door)).unwrap();
//! let sensors = store.list_sensors().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use types::{AlarmStatus, ArmingStatus, Sensor, SensorType};

use catguard_core::SensorId;

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // System Status
    // =========================================================================

    /// Get the current arming status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored value is corrupt.
    fn get_arming_status(&self) -> Result<ArmingStatus>;

    /// Persist a new arming status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn set_arming_status(&self, status: ArmingStatus) -> Result<()>;

    /// Get the current alarm status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored value is corrupt.
    fn get_alarm_status(&self) -> Result<AlarmStatus>;

    /// Persist a new alarm status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()>;

    // =========================================================================
    // Sensor Operations
    // =========================================================================

    /// Add a sensor. Adding a sensor whose ID is already stored overwrites it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn add_sensor(&self, sensor: &Sensor) -> Result<()>;

    /// Remove a sensor by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SensorNotFound` if the sensor doesn't exist.
    fn remove_sensor(&self, sensor_id: &SensorId) -> Result<()>;

    /// Replace the stored record of an existing sensor.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SensorNotFound` if the sensor doesn't exist.
    fn update_sensor(&self, sensor: &Sensor) -> Result<()>;

    /// Get a sensor by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_sensor(&self, sensor_id: &SensorId) -> Result<Option<Sensor>>;

    /// List every stored sensor, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_sensors(&self) -> Result<Vec<Sensor>>;
}
