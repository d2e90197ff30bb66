//! Core types and utilities for catguard.
//!
//! This crate provides the foundational types used throughout the catguard
//! security controller:
//!
//! - **Identifiers**: Strongly-typed IDs for sensors
//! - **Error types**: Common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use catguard_core::SensorId;
//!
//! let sensor_id = SensorId::generate();
//! let parsed: SensorId = sensor_id.to_string().parse().unwrap();
//! assert_eq!(sensor_id, parsed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;

pub use error::{CoreError, Result};
pub use ids::{IdError, SensorId};
