//! Security controller implementation.
//!
//! `SecurityService` owns the alarm state machine. It takes sensor, image,
//! and arming events, runs them through [`rules`](crate::rules), writes the
//! outcome to the store, and tells registered listeners.

use std::sync::Arc;

use catguard_core::SensorId;
use catguard_image::{CameraImage, ImageClassifier};
use catguard_store::{AlarmStatus, ArmingStatus, Sensor, Store};

use crate::error::{ControlError, Result};
use crate::listener::{ListenerRegistry, StatusListener};
use crate::rules::{self, ArmingEffect};
use crate::sensors::SensorRegistry;
use crate::types::{SecurityConfig, StatusSnapshot, CAT_CONFIDENCE_THRESHOLD};

/// Everything one triggering event changes, applied all at once.
#[derive(Debug, Default)]
struct Transition {
    /// Sensor records as they were before the event.
    before: Vec<Sensor>,
    /// Sensor records to write.
    after: Vec<Sensor>,
    /// Alarm statuses listeners hear, in order. The last one is persisted.
    statuses: Vec<AlarmStatus>,
}

impl Transition {
    fn alarm(status: AlarmStatus) -> Self {
        Self {
            statuses: vec![status],
            ..Self::default()
        }
    }
}

/// The security controller.
///
/// The store is the source of truth for arming and alarm status. Sensors are
/// tracked in memory as well and kept in step with the store on every add and
/// remove. Every mutating operation takes `&mut self`; hosts that share a
/// controller across threads must wrap it in a lock.
pub struct SecurityService<S: Store, C: ImageClassifier> {
    store: Arc<S>,
    classifier: C,
    sensors: SensorRegistry,
    listeners: ListenerRegistry,
    cat_detected: bool,
    config: SecurityConfig,
}

impl<S: Store, C: ImageClassifier> SecurityService<S, C> {
    /// Create a controller, loading the tracked sensors from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensors cannot be read.
    pub fn new(store: Arc<S>, classifier: C, config: SecurityConfig) -> Result<Self> {
        let sensors: SensorRegistry = store.list_sensors()?.into_iter().collect();

        tracing::debug!(
            sensors = sensors.len(),
            alarm_downgrade = %config.alarm_downgrade,
            "Loaded security controller"
        );

        Ok(Self {
            store,
            classifier,
            sensors,
            listeners: ListenerRegistry::new(),
            cat_detected: false,
            config,
        })
    }

    /// Create with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensors cannot be read.
    pub fn with_defaults(store: Arc<S>, classifier: C) -> Result<Self> {
        Self::new(store, classifier, SecurityConfig::default())
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SecurityConfig {
        &self.config
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a listener. Registering the same listener twice has no effect.
    pub fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        self.listeners.add(listener);
    }

    /// Unregister a listener. Unknown listeners are ignored.
    pub fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        self.listeners.remove(listener);
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Current alarm status.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn alarm_status(&self) -> Result<AlarmStatus> {
        Ok(self.store.get_alarm_status()?)
    }

    /// Current arming status.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn arming_status(&self) -> Result<ArmingStatus> {
        Ok(self.store.get_arming_status()?)
    }

    /// Result of the most recent image scan.
    #[must_use]
    pub const fn is_cat_detected(&self) -> bool {
        self.cat_detected
    }

    /// Write a new alarm status and notify every listener.
    ///
    /// Every rule goes through here.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails. Listeners are not notified
    /// in that case.
    pub fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.store.set_alarm_status(status)?;
        self.announce(status);
        Ok(())
    }

    fn announce(&self, status: AlarmStatus) {
        if status == AlarmStatus::Alarm {
            tracing::warn!(alarm_status = ?status, "Alarm raised");
        } else {
            tracing::info!(alarm_status = ?status, "Alarm status changed");
        }
        self.listeners.notify_status(status);
    }

    /// Change the arming status.
    ///
    /// Disarming clears the alarm. Arming while a cat was last seen raises the
    /// alarm straight away; otherwise arming resets every sensor to inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if a store operation fails. Sensors, alarm, and arming
    /// status are then left as they were.
    pub fn set_arming_status(&mut self, status: ArmingStatus) -> Result<()> {
        let effect = rules::on_arming_changed(status, self.cat_detected);
        tracing::debug!(arming_status = ?status, effect = ?effect, "Changing arming status");

        let transition = match effect {
            ArmingEffect::ClearAlarm => Transition::alarm(AlarmStatus::NoAlarm),
            ArmingEffect::RaiseAlarm => Transition::alarm(AlarmStatus::Alarm),
            ArmingEffect::ResetSensors => self.plan_sensor_reset()?,
        };
        self.commit(transition, Some(status))?;

        tracing::info!(arming_status = ?status, "Arming status: {status}");
        Ok(())
    }

    /// Deactivate every sensor in turn, running the deactivation rule for each.
    fn plan_sensor_reset(&self) -> Result<Transition> {
        let mut alarm = self.store.get_alarm_status()?;
        let mut candidate = self.sensors.clone();
        let mut transition = Transition::default();

        for sensor in self.sensors.iter() {
            let Some(reset) = candidate.get_mut(&sensor.sensor_id) else {
                continue;
            };
            reset.active = false;
            if sensor.active {
                transition.before.push(sensor.clone());
                transition.after.push(reset.clone());
            }

            if let Some(next) = rules::on_sensor_deactivated(
                alarm,
                candidate.any_active(),
                self.config.alarm_downgrade,
            ) {
                alarm = next;
                transition.statuses.push(next);
            }
        }

        Ok(transition)
    }

    /// Persist a transition, then update the tracked sensors and notify.
    ///
    /// Sensors are written first, then the alarm, then `arming` if given. A
    /// failed write undoes the earlier ones, and nothing is tracked or
    /// announced.
    fn commit(&mut self, transition: Transition, arming: Option<ArmingStatus>) -> Result<()> {
        let previous_alarm = match transition.statuses.last() {
            Some(_) => Some(self.store.get_alarm_status()?),
            None => None,
        };

        self.write_sensors(&transition)?;

        if let Some(&alarm) = transition.statuses.last() {
            if let Err(e) = self.store.set_alarm_status(alarm) {
                self.restore_sensors(&transition.before);
                return Err(e.into());
            }
        }

        if let Some(arming) = arming {
            if let Err(e) = self.store.set_arming_status(arming) {
                if let Some(alarm) = previous_alarm {
                    if let Err(rollback) = self.store.set_alarm_status(alarm) {
                        tracing::error!(error = %rollback, "Failed to roll back alarm status");
                    }
                }
                self.restore_sensors(&transition.before);
                return Err(e.into());
            }
        }

        for sensor in transition.after {
            self.sensors.insert(sensor);
        }
        for status in transition.statuses {
            self.announce(status);
        }
        Ok(())
    }

    fn write_sensors(&self, transition: &Transition) -> Result<()> {
        for (written, sensor) in transition.after.iter().enumerate() {
            if let Err(e) = self.store.update_sensor(sensor) {
                self.restore_sensors(&transition.before[..written]);
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn restore_sensors(&self, sensors: &[Sensor]) {
        for sensor in sensors {
            if let Err(e) = self.store.update_sensor(sensor) {
                tracing::error!(sensor_id = %sensor.sensor_id, error = %e, "Failed to roll back sensor");
            }
        }
    }

    // =========================================================================
    // Sensors
    // =========================================================================

    /// Sensors as persisted in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.store.list_sensors()?)
    }

    /// A tracked sensor by ID.
    #[must_use]
    pub fn sensor(&self, sensor_id: &SensorId) -> Option<&Sensor> {
        self.sensors.get(sensor_id)
    }

    /// Tracked sensors in insertion order.
    pub fn tracked_sensors(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter()
    }

    /// Tracked sensors that are currently active.
    pub fn active_sensors(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.active()
    }

    /// Start tracking a sensor and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails; the sensor is not tracked
    /// in that case.
    pub fn add_sensor(&mut self, sensor: Sensor) -> Result<()> {
        self.store.add_sensor(&sensor)?;
        tracing::info!(
            sensor_id = %sensor.sensor_id,
            name = %sensor.name,
            sensor_type = ?sensor.sensor_type,
            "Added sensor"
        );
        self.sensors.insert(sensor);
        Ok(())
    }

    /// Stop tracking a sensor and delete it from the store.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::UnknownSensor` if the sensor is not tracked.
    pub fn remove_sensor(&mut self, sensor_id: &SensorId) -> Result<Sensor> {
        if !self.sensors.contains(sensor_id) {
            return Err(ControlError::UnknownSensor(*sensor_id));
        }

        self.store.remove_sensor(sensor_id)?;
        let removed = self
            .sensors
            .remove(sensor_id)
            .ok_or(ControlError::UnknownSensor(*sensor_id))?;

        tracing::info!(sensor_id = %sensor_id, name = %removed.name, "Removed sensor");
        Ok(removed)
    }

    /// Set a sensor active or inactive and update the alarm.
    ///
    /// Inactive to active runs the activation rule. Any request for inactive
    /// runs the deactivation rule, even if the sensor was already inactive.
    /// Active to active changes nothing. The sensor is persisted in every
    /// case, before the alarm.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::UnknownSensor` if the sensor is not tracked, or
    /// a store error. On error neither the sensor nor the alarm changes.
    pub fn change_sensor_activation(&mut self, sensor_id: &SensorId, active: bool) -> Result<()> {
        let current = self
            .sensors
            .get(sensor_id)
            .cloned()
            .ok_or(ControlError::UnknownSensor(*sensor_id))?;
        let updated = Sensor {
            active,
            ..current.clone()
        };

        tracing::debug!(
            sensor_id = %sensor_id,
            name = %updated.name,
            was_active = current.active,
            active,
            "Sensor activation changed"
        );

        let next = match (current.active, active) {
            (false, true) => rules::on_sensor_activated(
                self.store.get_arming_status()?,
                self.store.get_alarm_status()?,
            ),
            (_, false) => {
                let mut candidate = self.sensors.clone();
                candidate.insert(updated.clone());
                rules::on_sensor_deactivated(
                    self.store.get_alarm_status()?,
                    candidate.any_active(),
                    self.config.alarm_downgrade,
                )
            }
            (true, true) => None,
        };

        self.commit(
            Transition {
                before: vec![current],
                after: vec![updated],
                statuses: next.into_iter().collect(),
            },
            None,
        )
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Classify a camera frame and update the alarm.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Classification` if the classifier fails, or a
    /// store error. The last scan result and the alarm are then left
    /// untouched.
    pub fn process_image(&mut self, image: &CameraImage) -> Result<()> {
        let cat = self
            .classifier
            .image_contains_cat(image, CAT_CONFIDENCE_THRESHOLD)?;
        tracing::debug!(cat, "Processed camera image");

        let arming = self.store.get_arming_status()?;
        match rules::on_cat_scan(cat, arming, self.sensors.any_active()) {
            Some(next) => {
                self.commit(Transition::alarm(next), None)?;
                self.cat_detected = cat;
                self.listeners.notify_cat_detected(cat);
            }
            None => self.cat_detected = cat,
        }
        Ok(())
    }

    /// Current state of the whole system.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn snapshot(&self) -> Result<StatusSnapshot> {
        Ok(StatusSnapshot {
            arming_status: self.arming_status()?,
            alarm_status: self.alarm_status()?,
            cat_detected: self.cat_detected,
            sensors: self.sensors.iter().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catguard_image::{FixedClassifier, ImageError};
    use catguard_store::{MemoryStore, SensorType, StoreError};
    use parking_lot::Mutex;

    use crate::types::AlarmDowngrade;

    /// Classifier whose answer can be changed between scans.
    #[derive(Default)]
    struct ScriptedClassifier {
        answer: Mutex<Option<bool>>,
        thresholds: Mutex<Vec<f32>>,
    }

    impl ScriptedClassifier {
        fn answer(&self, cat: bool) {
            *self.answer.lock() = Some(cat);
        }

        fn fail(&self) {
            *self.answer.lock() = None;
        }
    }

    impl ImageClassifier for ScriptedClassifier {
        fn image_contains_cat(
            &self,
            _image: &CameraImage,
            confidence_threshold: f32,
        ) -> catguard_image::Result<bool> {
            self.thresholds.lock().push(confidence_threshold);
            (*self.answer.lock()).ok_or_else(|| ImageError::Unavailable("offline".to_string()))
        }
    }

    #[derive(Default)]
    struct Recorder {
        statuses: Mutex<Vec<AlarmStatus>>,
        cats: Mutex<Vec<bool>>,
    }

    impl StatusListener for Recorder {
        fn notify(&self, status: AlarmStatus) {
            self.statuses.lock().push(status);
        }

        fn cat_detected(&self, detected: bool) {
            self.cats.lock().push(detected);
        }
    }

    /// One-shot write failures to inject into a [`FaultyStore`].
    #[derive(Default)]
    struct Faults {
        /// Sensor writes that succeed before the next one fails.
        sensor_writes_allowed: Option<usize>,
        alarm_write: bool,
        arming_write: bool,
    }

    /// Memory store whose writes can be made to fail once.
    #[derive(Default)]
    struct FaultyStore {
        inner: MemoryStore,
        faults: Mutex<Faults>,
    }

    impl FaultyStore {
        fn disk_full() -> StoreError {
            StoreError::Database("disk full".to_string())
        }

        fn fail_sensor_write_after(&self, allowed: usize) {
            self.faults.lock().sensor_writes_allowed = Some(allowed);
        }

        fn fail_alarm_write(&self) {
            self.faults.lock().alarm_write = true;
        }

        fn fail_arming_write(&self) {
            self.faults.lock().arming_write = true;
        }
    }

    impl Store for FaultyStore {
        fn get_arming_status(&self) -> catguard_store::Result<ArmingStatus> {
            self.inner.get_arming_status()
        }

        fn set_arming_status(&self, status: ArmingStatus) -> catguard_store::Result<()> {
            if std::mem::take(&mut self.faults.lock().arming_write) {
                return Err(Self::disk_full());
            }
            self.inner.set_arming_status(status)
        }

        fn get_alarm_status(&self) -> catguard_store::Result<AlarmStatus> {
            self.inner.get_alarm_status()
        }

        fn set_alarm_status(&self, status: AlarmStatus) -> catguard_store::Result<()> {
            if std::mem::take(&mut self.faults.lock().alarm_write) {
                return Err(Self::disk_full());
            }
            self.inner.set_alarm_status(status)
        }

        fn add_sensor(&self, sensor: &Sensor) -> catguard_store::Result<()> {
            self.inner.add_sensor(sensor)
        }

        fn remove_sensor(&self, sensor_id: &SensorId) -> catguard_store::Result<()> {
            self.inner.remove_sensor(sensor_id)
        }

        fn update_sensor(&self, sensor: &Sensor) -> catguard_store::Result<()> {
            {
                let mut faults = self.faults.lock();
                match faults.sensor_writes_allowed {
                    Some(0) => {
                        faults.sensor_writes_allowed = None;
                        return Err(Self::disk_full());
                    }
                    Some(left) => faults.sensor_writes_allowed = Some(left - 1),
                    None => {}
                }
            }
            self.inner.update_sensor(sensor)
        }

        fn get_sensor(&self, sensor_id: &SensorId) -> catguard_store::Result<Option<Sensor>> {
            self.inner.get_sensor(sensor_id)
        }

        fn list_sensors(&self) -> catguard_store::Result<Vec<Sensor>> {
            self.inner.list_sensors()
        }
    }

    struct Fixture<S: Store = MemoryStore> {
        service: SecurityService<S, Arc<ScriptedClassifier>>,
        classifier: Arc<ScriptedClassifier>,
        door: SensorId,
        window: SensorId,
        garden: SensorId,
    }

    fn setup_with(config: SecurityConfig) -> Fixture {
        setup_on(Arc::new(MemoryStore::new()), config)
    }

    fn setup_on<S: Store>(store: Arc<S>, config: SecurityConfig) -> Fixture<S> {
        let classifier = Arc::new(ScriptedClassifier::default());
        let mut service = SecurityService::new(store, Arc::clone(&classifier), config).unwrap();

        let door = Sensor::new("Door", SensorType::Door);
        let window = Sensor::new("Window", SensorType::Window);
        let garden = Sensor::new("Garden", SensorType::Motion);
        let ids = (door.sensor_id, window.sensor_id, garden.sensor_id);
        service.add_sensor(door).unwrap();
        service.add_sensor(window).unwrap();
        service.add_sensor(garden).unwrap();

        service.set_arming_status(ArmingStatus::Disarmed).unwrap();
        service.set_alarm_status(AlarmStatus::NoAlarm).unwrap();

        Fixture {
            service,
            classifier,
            door: ids.0,
            window: ids.1,
            garden: ids.2,
        }
    }

    fn setup() -> Fixture {
        setup_with(SecurityConfig::default())
    }

    fn image() -> CameraImage {
        CameraImage::from_bytes(vec![0xffu8, 0xd8, 0xff])
    }

    fn faulty_setup() -> Fixture<FaultyStore> {
        setup_on(Arc::new(FaultyStore::default()), SecurityConfig::default())
    }

    impl<S: Store> Fixture<S> {
        fn all(&self) -> [SensorId; 3] {
            [self.door, self.window, self.garden]
        }

        fn alarm(&self) -> AlarmStatus {
            self.service.alarm_status().unwrap()
        }

        fn scan(&mut self, cat: bool) {
            self.classifier.answer(cat);
            self.service.process_image(&image()).unwrap();
        }

        fn activate_all(&mut self) {
            for id in self.all() {
                self.service.change_sensor_activation(&id, true).unwrap();
            }
        }

        fn tracked_active(&self, sensor_id: &SensorId) -> bool {
            self.service.sensor(sensor_id).unwrap().active
        }

        fn stored_active(&self, sensor_id: &SensorId) -> bool {
            self.service
                .store()
                .get_sensor(sensor_id)
                .unwrap()
                .unwrap()
                .active
        }

        fn listen(&mut self) -> Arc<Recorder> {
            let recorder = Arc::new(Recorder::default());
            self.service.add_status_listener(recorder.clone());
            recorder
        }
    }

    #[test]
    fn armed_sensor_active_goes_pending() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();

        f.service.change_sensor_activation(&f.garden, true).unwrap();

        assert_eq!(f.alarm(), AlarmStatus::PendingAlarm);
    }

    #[test]
    fn armed_sensor_active_while_pending_goes_alarm() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        f.service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();

        f.service.change_sensor_activation(&f.garden, true).unwrap();

        assert_eq!(f.alarm(), AlarmStatus::Alarm);
    }

    #[test]
    fn disarmed_activation_changes_nothing() {
        let mut f = setup();
        f.activate_all();
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);

        f.service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();
        f.service.change_sensor_activation(&f.door, false).unwrap();
        f.service.change_sensor_activation(&f.door, true).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::PendingAlarm);
    }

    #[test]
    fn pending_all_sensors_inactive_goes_no_alarm() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        f.service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();

        for id in f.all() {
            f.service.change_sensor_activation(&id, false).unwrap();
        }

        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
    }

    #[test]
    fn alarm_unchanged_by_sensor_activity() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        f.service.set_alarm_status(AlarmStatus::Alarm).unwrap();

        f.activate_all();
        assert_eq!(f.alarm(), AlarmStatus::Alarm);

        for id in f.all() {
            f.service.change_sensor_activation(&id, false).unwrap();
        }
        assert_eq!(f.alarm(), AlarmStatus::Alarm);
    }

    #[test]
    fn pending_with_active_sensors_reactivated_goes_alarm() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        f.service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();

        f.activate_all();
        f.service.change_sensor_activation(&f.garden, true).unwrap();

        assert_eq!(f.alarm(), AlarmStatus::Alarm);
    }

    #[test]
    fn deactivating_inactive_sensor_keeps_alarm() {
        for start in [AlarmStatus::NoAlarm, AlarmStatus::Alarm] {
            let mut f = setup();
            f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
            f.service.set_alarm_status(start).unwrap();

            for id in f.all() {
                f.service.change_sensor_activation(&id, false).unwrap();
            }

            assert_eq!(f.alarm(), start);
        }
    }

    #[test]
    fn one_of_several_active_deactivated_keeps_status() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        f.activate_all();
        assert_eq!(f.alarm(), AlarmStatus::Alarm);

        f.service.change_sensor_activation(&f.garden, false).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::Alarm);

        // Pending is held too while another sensor is still tripped
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        f.service.change_sensor_activation(&f.door, true).unwrap();
        f.service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();
        f.service.change_sensor_activation(&f.window, false).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::PendingAlarm);
    }

    #[test]
    fn step_down_policy_downgrades_alarm() {
        let mut f = setup_with(SecurityConfig {
            alarm_downgrade: AlarmDowngrade::StepDown,
        });
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        f.service.change_sensor_activation(&f.door, true).unwrap();
        f.service.change_sensor_activation(&f.garden, true).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::Alarm);

        f.service.change_sensor_activation(&f.door, false).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::Alarm);

        f.service.change_sensor_activation(&f.garden, false).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::PendingAlarm);
    }

    #[test]
    fn cat_while_armed_home_raises_alarm() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();

        f.scan(true);

        assert_eq!(f.alarm(), AlarmStatus::Alarm);
        assert!(f.service.is_cat_detected());
    }

    #[test]
    fn no_cat_no_active_sensors_clears_alarm() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        f.scan(true);
        assert_eq!(f.alarm(), AlarmStatus::Alarm);

        f.scan(false);
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
        assert!(!f.service.is_cat_detected());
    }

    #[test]
    fn cat_overrides_active_sensors() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        f.service.change_sensor_activation(&f.door, true).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::PendingAlarm);

        f.scan(true);
        assert_eq!(f.alarm(), AlarmStatus::Alarm);
    }

    #[test]
    fn no_cat_with_active_sensor_keeps_alarm() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        f.scan(true);
        f.service.change_sensor_activation(&f.garden, true).unwrap();

        f.scan(false);

        assert_eq!(f.alarm(), AlarmStatus::Alarm);
    }

    #[test]
    fn disarm_clears_alarm_after_cat() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        f.scan(true);
        assert_eq!(f.alarm(), AlarmStatus::Alarm);

        f.service.set_arming_status(ArmingStatus::Disarmed).unwrap();

        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
    }

    #[test]
    fn arming_resets_sensors() {
        let mut f = setup();
        f.service.change_sensor_activation(&f.garden, true).unwrap();
        f.activate_all();

        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();

        assert_eq!(f.service.active_sensors().count(), 0);
        for sensor in f.service.sensors().unwrap() {
            assert!(!sensor.active, "{} still active in store", sensor.name);
        }
    }

    #[test]
    fn cat_seen_while_disarmed_then_armed_raises_alarm() {
        let mut f = setup();
        f.scan(true);
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);

        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();

        assert_eq!(f.alarm(), AlarmStatus::Alarm);
        assert_eq!(
            f.service.arming_status().unwrap(),
            ArmingStatus::ArmedHome
        );
    }

    #[test]
    fn arming_with_cat_leaves_sensors_alone() {
        let mut f = setup();
        f.service.change_sensor_activation(&f.door, true).unwrap();
        f.scan(true);

        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();

        assert_eq!(f.alarm(), AlarmStatus::Alarm);
        assert!(f.service.sensor(&f.door).unwrap().active);
    }

    #[test]
    fn classifier_called_with_fixed_threshold() {
        let mut f = setup();
        f.scan(false);
        f.scan(true);

        assert_eq!(*f.classifier.thresholds.lock(), vec![50.0, 50.0]);
    }

    #[test]
    fn classifier_failure_propagates() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        f.scan(true);
        f.classifier.fail();

        let result = f.service.process_image(&image());

        assert!(matches!(result, Err(ControlError::Classification(_))));
        assert!(f.service.is_cat_detected());
        assert_eq!(f.alarm(), AlarmStatus::Alarm);
    }

    #[test]
    fn listeners_see_every_status_write() {
        let mut f = setup();
        let recorder = Arc::new(Recorder::default());
        let listener: Arc<dyn StatusListener> = recorder.clone();
        f.service.add_status_listener(Arc::clone(&listener));
        f.service.add_status_listener(Arc::clone(&listener));

        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        f.service.change_sensor_activation(&f.door, true).unwrap();
        f.service.change_sensor_activation(&f.window, true).unwrap();
        f.service.set_arming_status(ArmingStatus::Disarmed).unwrap();

        assert_eq!(
            *recorder.statuses.lock(),
            vec![
                AlarmStatus::PendingAlarm,
                AlarmStatus::Alarm,
                AlarmStatus::NoAlarm
            ]
        );
        assert!(recorder.cats.lock().is_empty());

        f.service.remove_status_listener(&listener);
        f.service.set_alarm_status(AlarmStatus::Alarm).unwrap();
        assert_eq!(recorder.statuses.lock().len(), 3);
    }

    #[test]
    fn cat_hook_only_on_changing_scans() {
        let mut f = setup();
        let recorder = Arc::new(Recorder::default());
        f.service.add_status_listener(recorder.clone());

        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        f.scan(true);
        f.service.change_sensor_activation(&f.door, true).unwrap();
        // Sensor still active and no cat: alarm untouched, no cat notification
        f.scan(false);

        assert_eq!(*recorder.cats.lock(), vec![true]);
        assert_eq!(*recorder.statuses.lock(), vec![AlarmStatus::Alarm]);

        f.service.change_sensor_activation(&f.door, false).unwrap();
        f.scan(false);

        assert_eq!(*recorder.cats.lock(), vec![true, false]);
        assert_eq!(
            *recorder.statuses.lock(),
            vec![AlarmStatus::Alarm, AlarmStatus::NoAlarm]
        );
        assert!(!f.service.is_cat_detected());
    }

    #[test]
    fn failed_sensor_write_changes_nothing() {
        let mut f = faulty_setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        let recorder = f.listen();

        f.service.store().fail_sensor_write_after(0);
        let result = f.service.change_sensor_activation(&f.door, true);

        assert!(matches!(result, Err(ControlError::Store(StoreError::Database(_)))));
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
        assert!(!f.tracked_active(&f.door));
        assert!(!f.stored_active(&f.door));
        assert!(recorder.statuses.lock().is_empty());
    }

    #[test]
    fn failed_alarm_write_rolls_back_sensor() {
        let mut f = faulty_setup();
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        let recorder = f.listen();

        f.service.store().fail_alarm_write();
        let result = f.service.change_sensor_activation(&f.door, true);

        assert!(matches!(result, Err(ControlError::Store(_))));
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
        assert!(!f.tracked_active(&f.door));
        assert!(!f.stored_active(&f.door));
        assert!(recorder.statuses.lock().is_empty());

        // The next attempt goes through cleanly
        f.service.change_sensor_activation(&f.door, true).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::PendingAlarm);
        assert!(f.stored_active(&f.door));
    }

    #[test]
    fn failed_scan_keeps_cat_flag() {
        let mut f = faulty_setup();
        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        let recorder = f.listen();

        f.classifier.answer(true);
        f.service.store().fail_alarm_write();
        let result = f.service.process_image(&image());

        assert!(matches!(result, Err(ControlError::Store(_))));
        assert!(!f.service.is_cat_detected());
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
        assert!(recorder.statuses.lock().is_empty());
        assert!(recorder.cats.lock().is_empty());
    }

    #[test]
    fn failed_reset_midway_restores_sensors() {
        let mut f = faulty_setup();
        f.activate_all();
        f.service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();
        let recorder = f.listen();

        f.service.store().fail_sensor_write_after(1);
        let result = f.service.set_arming_status(ArmingStatus::ArmedAway);

        assert!(matches!(result, Err(ControlError::Store(_))));
        assert_eq!(f.service.arming_status().unwrap(), ArmingStatus::Disarmed);
        assert_eq!(f.alarm(), AlarmStatus::PendingAlarm);
        for id in f.all() {
            assert!(f.tracked_active(&id));
            assert!(f.stored_active(&id));
        }
        assert!(recorder.statuses.lock().is_empty());
    }

    #[test]
    fn failed_arming_write_rolls_back_reset() {
        let mut f = faulty_setup();
        f.activate_all();
        f.service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();
        let recorder = f.listen();

        f.service.store().fail_arming_write();
        let result = f.service.set_arming_status(ArmingStatus::ArmedHome);

        assert!(matches!(result, Err(ControlError::Store(_))));
        assert_eq!(f.service.arming_status().unwrap(), ArmingStatus::Disarmed);
        assert_eq!(f.alarm(), AlarmStatus::PendingAlarm);
        for id in f.all() {
            assert!(f.tracked_active(&id));
            assert!(f.stored_active(&id));
        }
        assert!(recorder.statuses.lock().is_empty());

        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
        assert_eq!(f.service.active_sensors().count(), 0);
    }

    #[test]
    fn reset_announces_each_step_and_persists_last() {
        let mut f = setup_with(SecurityConfig {
            alarm_downgrade: AlarmDowngrade::StepDown,
        });
        f.service.change_sensor_activation(&f.door, true).unwrap();
        f.service.set_alarm_status(AlarmStatus::Alarm).unwrap();
        let recorder = f.listen();

        // Door clears first: Alarm steps down, then each clear sensor drops it further
        f.service.set_arming_status(ArmingStatus::ArmedAway).unwrap();

        assert_eq!(
            *recorder.statuses.lock(),
            vec![AlarmStatus::PendingAlarm, AlarmStatus::NoAlarm]
        );
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
    }

    #[test]
    fn unknown_sensor_is_an_error() {
        let mut f = setup();
        let stranger = SensorId::generate();

        assert!(matches!(
            f.service.change_sensor_activation(&stranger, true),
            Err(ControlError::UnknownSensor(id)) if id == stranger
        ));
        assert!(matches!(
            f.service.remove_sensor(&stranger),
            Err(ControlError::UnknownSensor(_))
        ));
    }

    #[test]
    fn add_and_remove_keep_store_in_sync() {
        let mut f = setup();
        assert_eq!(f.service.sensors().unwrap().len(), 3);

        let removed = f.service.remove_sensor(&f.window).unwrap();
        assert_eq!(removed.name, "Window");
        assert!(f.service.sensor(&f.window).is_none());

        let names: Vec<_> = f
            .service
            .sensors()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Door", "Garden"]);
        assert_eq!(f.alarm(), AlarmStatus::NoAlarm);
    }

    #[test]
    fn sensors_loaded_from_store() {
        let door = Sensor {
            active: true,
            ..Sensor::new("Door", SensorType::Door)
        };
        let store = Arc::new(MemoryStore::with_sensors([door.clone()]));

        let service = SecurityService::with_defaults(store, FixedClassifier::new(false)).unwrap();

        assert_eq!(service.sensor(&door.sensor_id), Some(&door));
        assert_eq!(service.active_sensors().count(), 1);
    }

    #[test]
    fn snapshot_reports_state() {
        let mut f = setup();
        f.service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        f.scan(true);

        let snapshot = f.service.snapshot().unwrap();
        assert_eq!(snapshot.arming_status, ArmingStatus::ArmedHome);
        assert_eq!(snapshot.alarm_status, AlarmStatus::Alarm);
        assert!(snapshot.cat_detected);
        assert_eq!(snapshot.sensors.len(), 3);
        assert_eq!(snapshot.sensors[0].name, "Door");
    }
}
