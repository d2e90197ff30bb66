//! Configuration and reporting types for the controller.

use std::fmt;
use std::str::FromStr;

use catguard_store::{AlarmStatus, ArmingStatus, Sensor};
use serde::{Deserialize, Serialize};

/// Confidence (percent) the classifier must reach before a frame counts as a cat.
pub const CAT_CONFIDENCE_THRESHOLD: f32 = 50.0;

/// What happens to a sounding alarm once every sensor has cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmDowngrade {
    /// `Alarm` stays until the system is disarmed.
    #[default]
    Sticky,
    /// `Alarm` drops back to `PendingAlarm`.
    StepDown,
}

impl AlarmDowngrade {
    /// The configuration spelling of this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sticky => "sticky",
            Self::StepDown => "step_down",
        }
    }
}

impl fmt::Display for AlarmDowngrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmDowngrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sticky" => Ok(Self::Sticky),
            "step_down" => Ok(Self::StepDown),
            other => Err(format!(
                "unknown alarm downgrade policy '{other}' (expected sticky or step_down)"
            )),
        }
    }
}

/// Configuration for the security controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Policy applied to `Alarm` when the last active sensor clears.
    #[serde(default)]
    pub alarm_downgrade: AlarmDowngrade,
}

/// Point-in-time view of the whole system.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Current arming status.
    pub arming_status: ArmingStatus,
    /// Current alarm status.
    pub alarm_status: AlarmStatus,
    /// Result of the most recent image scan.
    pub cat_detected: bool,
    /// Tracked sensors in insertion order.
    pub sensors: Vec<Sensor>,
}
