//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Sensor records, keyed by `sensor_id`.
    pub const SENSORS: &str = "sensors";

    /// Single-value system settings (arming and alarm status).
    pub const SETTINGS: &str = "settings";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::SENSORS, cf::SETTINGS]
}
