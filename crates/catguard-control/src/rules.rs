//! Alarm transition rules.
//!
//! Every function here is pure: it takes the current arming/alarm state plus
//! the triggering event and returns the alarm status to write, or `None` when
//! the alarm must stay as it is. The controller applies the result.
//!
//! # Transitions
//!
//! ```text
//!            sensor trip (armed)        sensor trip (armed)
//!  ┌──────────┐ ───────────▶ ┌──────────────┐ ───────────▶ ┌─────────┐
//!  │ NoAlarm  │              │ PendingAlarm │              │  Alarm  │
//!  └──────────┘ ◀─────────── └──────────────┘ ◀ ─ ─ ─ ─ ─  └─────────┘
//!       ▲        all sensors clear              all clear      │
//!       │                                     (StepDown only)  │
//!       └──────────── disarm / no cat & no active sensors ─────┘
//!
//!  cat seen while ArmedHome ──────────────────────────────────▶ Alarm
//! ```

use catguard_store::{AlarmStatus, ArmingStatus};

use crate::types::AlarmDowngrade;

/// What a change of arming status does to the alarm and sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingEffect {
    /// Disarming: force `NoAlarm`.
    ClearAlarm,
    /// Arming while a cat is in view: force `Alarm`, leave sensors alone.
    RaiseAlarm,
    /// Arming: deactivate every sensor.
    ResetSensors,
}

/// Alarm status after a sensor goes from inactive to active.
#[must_use]
pub const fn on_sensor_activated(arming: ArmingStatus, alarm: AlarmStatus) -> Option<AlarmStatus> {
    if !arming.is_armed() {
        return None;
    }
    match alarm {
        AlarmStatus::NoAlarm => Some(AlarmStatus::PendingAlarm),
        AlarmStatus::PendingAlarm => Some(AlarmStatus::Alarm),
        AlarmStatus::Alarm => None,
    }
}

/// Alarm status after a sensor is set inactive.
///
/// Nothing changes while any sensor is still active.
#[must_use]
pub const fn on_sensor_deactivated(
    alarm: AlarmStatus,
    any_active: bool,
    downgrade: AlarmDowngrade,
) -> Option<AlarmStatus> {
    if any_active {
        return None;
    }
    match (alarm, downgrade) {
        (AlarmStatus::PendingAlarm, _) => Some(AlarmStatus::NoAlarm),
        (AlarmStatus::Alarm, AlarmDowngrade::StepDown) => Some(AlarmStatus::PendingAlarm),
        (AlarmStatus::Alarm, AlarmDowngrade::Sticky) | (AlarmStatus::NoAlarm, _) => None,
    }
}

/// Alarm status after an image scan.
///
/// A cat seen while armed at home overrides sensor state. A clear scan with
/// no active sensors resets the alarm. Otherwise the alarm is left alone, and
/// the controller skips the cat-detected notification too.
#[must_use]
pub const fn on_cat_scan(cat: bool, arming: ArmingStatus, any_active: bool) -> Option<AlarmStatus> {
    if cat && matches!(arming, ArmingStatus::ArmedHome) {
        Some(AlarmStatus::Alarm)
    } else if !any_active {
        Some(AlarmStatus::NoAlarm)
    } else {
        None
    }
}

/// Effect of switching to `target` arming status.
#[must_use]
pub const fn on_arming_changed(target: ArmingStatus, cat_detected: bool) -> ArmingEffect {
    match target {
        ArmingStatus::Disarmed => ArmingEffect::ClearAlarm,
        ArmingStatus::ArmedHome | ArmingStatus::ArmedAway if cat_detected => {
            ArmingEffect::RaiseAlarm
        }
        ArmingStatus::ArmedHome | ArmingStatus::ArmedAway => ArmingEffect::ResetSensors,
    }
}
