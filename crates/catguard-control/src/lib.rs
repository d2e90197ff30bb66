//! Alarm state machine for catguard.
//!
//! This crate holds the business logic of the security system: how the arming
//! status, sensor activity, and cat sightings combine into an alarm status.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 catguard CLI / host application             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SecurityService                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │  Sensor     │ │  Listener   │ │    Alarm            │    │
//! │  │  Registry   │ │  Registry   │ │    Rules            │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    ┌─────────┴─────────┐
//!                    ▼                   ▼
//!             ┌────────────┐      ┌────────────┐
//!             │   Store    │      │ Classifier │
//!             │ (RocksDB)  │      │  (images)  │
//!             └────────────┘      └────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use catguard_control::{ArmingStatus, AlarmStatus, SecurityService};
//! use catguard_image::FixedClassifier;
//! use catguard_store::{MemoryStore, Sensor, SensorType};
//!
//! # fn example() -> catguard_control::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let mut security = SecurityService::with_defaults(store, FixedClassifier::new(false))?;
//!
//! let garden = Sensor::new("Garden", SensorType::Motion);
//! let garden_id = garden.sensor_id;
//! security.add_sensor(garden)?;
//!
//! security.set_arming_status(ArmingStatus::ArmedAway)?;
//! security.change_sensor_activation(&garden_id, true)?;
//! assert_eq!(security.alarm_status()?, AlarmStatus::PendingAlarm);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Rules
//!
//! - A sensor tripping while armed escalates `NoAlarm` → `PendingAlarm` →
//!   `Alarm`. While disarmed it does nothing.
//! - Once no sensor is active, `PendingAlarm` drops to `NoAlarm`. `Alarm`
//!   stays unless [`AlarmDowngrade::StepDown`] is configured.
//! - A cat seen while armed at home raises `Alarm`. A clear scan with no
//!   active sensors resets to `NoAlarm`.
//! - Disarming clears the alarm. Arming raises `Alarm` if a cat was last
//!   seen, and otherwise resets every sensor.
//!
//! See the [`rules`] module for the transition functions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod listener;
pub mod rules;
pub mod sensors;
pub mod service;
pub mod types;

pub use error::{ControlError, Result};
pub use listener::{ListenerRegistry, LoggingListener, StatusListener};
pub use sensors::SensorRegistry;
pub use service::SecurityService;
pub use types::{AlarmDowngrade, SecurityConfig, StatusSnapshot, CAT_CONFIDENCE_THRESHOLD};

// Re-export commonly used types from dependencies for convenience
pub use catguard_core::SensorId;
pub use catguard_store::{AlarmStatus, ArmingStatus, Sensor, SensorType};
