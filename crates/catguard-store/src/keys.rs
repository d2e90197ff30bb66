//! Key encoding utilities for `RocksDB`.

use catguard_core::{IdError, SensorId};

/// Settings key holding the arming status byte.
pub const ARMING_STATUS: &[u8] = b"arming_status";

/// Settings key holding the alarm status byte.
pub const ALARM_STATUS: &[u8] = b"alarm_status";

/// Encode a sensor key (just the sensor ID bytes).
#[must_use]
pub fn sensor_key(sensor_id: &SensorId) -> Vec<u8> {
    sensor_id.as_bytes().to_vec()
}

/// Decode a sensor ID from a sensor key.
///
/// # Errors
///
/// Returns `IdError::InvalidLength` if the key is not 16 bytes.
pub fn sensor_id_from_key(key: &[u8]) -> Result<SensorId, IdError> {
    SensorId::try_from(key)
}
