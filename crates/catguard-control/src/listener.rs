//! Status listeners.
//!
//! Listeners are told about every alarm status write and about image scans
//! that changed the alarm. Calls happen synchronously on the thread running
//! the controller operation, in registration order.

use std::fmt;
use std::sync::Arc;

use catguard_store::AlarmStatus;

/// Observer of controller state changes.
pub trait StatusListener: Send + Sync {
    /// The alarm status was written.
    fn notify(&self, status: AlarmStatus);

    /// An image scan changed the alarm; `detected` is the scan result.
    fn cat_detected(&self, detected: bool);
}

/// Registry of listeners with set semantics by identity.
///
/// Two handles are the same listener when they point at the same allocation.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn StatusListener>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns false if it was already registered.
    pub fn add(&mut self, listener: Arc<dyn StatusListener>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove(&mut self, listener: &Arc<dyn StatusListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    /// Check whether a listener is registered.
    #[must_use]
    pub fn contains(&self, listener: &Arc<dyn StatusListener>) -> bool {
        self.listeners.iter().any(|l| Arc::ptr_eq(l, listener))
    }

    /// Tell every listener about an alarm status write.
    pub fn notify_status(&self, status: AlarmStatus) {
        for listener in &self.listeners {
            listener.notify(status);
        }
    }

    /// Tell every listener about a cat scan that changed the alarm.
    pub fn notify_cat_detected(&self, detected: bool) {
        for listener in &self.listeners {
            listener.cat_detected(detected);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Listener that writes every notification to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl StatusListener for LoggingListener {
    fn notify(&self, status: AlarmStatus) {
        tracing::info!(alarm_status = ?status, "Alarm status: {status}");
    }

    fn cat_detected(&self, detected: bool) {
        tracing::info!(detected, "Cat detection changed");
    }
}
