//! Domain types stored in the database.
//!
//! These types represent the persisted state of the security system: the
//! arming mode, the alarm level, and the registered sensors.

use std::fmt;

use catguard_core::SensorId;
use serde::{Deserialize, Serialize};

/// Whether the system is armed, and in which mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ArmingStatus {
    /// Sensors have no alarm consequence.
    #[default]
    Disarmed = 1,
    /// Armed while occupants are home. Cat sightings raise the alarm.
    ArmedHome = 2,
    /// Armed while the house is empty.
    ArmedAway = 3,
}

impl ArmingStatus {
    /// Convert the status to its numeric representation.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Try to convert a numeric value to an `ArmingStatus`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Disarmed),
            2 => Some(Self::ArmedHome),
            3 => Some(Self::ArmedAway),
            _ => None,
        }
    }

    /// Returns true for either armed mode.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        !matches!(self, Self::Disarmed)
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Disarmed => "Disarmed",
            Self::ArmedHome => "Armed - At Home",
            Self::ArmedAway => "Armed - Away",
        }
    }
}

impl fmt::Display for ArmingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Severity of the current alarm condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AlarmStatus {
    /// Nothing to report.
    #[default]
    NoAlarm = 1,
    /// A sensor tripped while armed; one more trip raises the alarm.
    PendingAlarm = 2,
    /// The alarm is sounding.
    Alarm = 3,
}

impl AlarmStatus {
    /// Convert the status to its numeric representation.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Try to convert a numeric value to an `AlarmStatus`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::NoAlarm),
            2 => Some(Self::PendingAlarm),
            3 => Some(Self::Alarm),
            _ => None,
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoAlarm => "Cool and Good",
            Self::PendingAlarm => "I'm in Danger...",
            Self::Alarm => "Awooga!",
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Physical kind of sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    /// Door contact.
    Door,
    /// Window contact.
    Window,
    /// Motion detector.
    Motion,
}

/// A sensor record stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    /// Unique identifier for the sensor.
    pub sensor_id: SensorId,
    /// Display name.
    pub name: String,
    /// What the sensor is attached to.
    pub sensor_type: SensorType,
    /// Whether the sensor is currently tripped.
    pub active: bool,
}

impl Sensor {
    /// Create a new inactive sensor with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            sensor_id: SensorId::generate(),
            name: name.into(),
            sensor_type,
            active: false,
        }
    }
}
