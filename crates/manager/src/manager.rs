//! Sensor registry and scheduler.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use contracts::{
    is_every_tick, period_elapsed, Diagnostic, RunOnceReport, SensorDescriptor, SensorId, SensorIdAllocator,
    SharedSink, SimTime, TracingSink, NO_SENSOR,
};
use sensor_factory::{Sensor, SensorFactory};
use tracing::{debug, info, instrument, warn};

use crate::error::{ManagerError, Result};

const COMPONENT: &str = "manager";

/// Sensor manager
///
/// Owns every registered sensor, hands out ids and steps the sensors that
/// are due. Ids come from a monotonic counter and are never reused, so a
/// stale id of a removed sensor simply resolves to nothing.
pub struct Manager {
    /// Registered sensors, iterated in id order
    sensors: BTreeMap<SensorId, Box<dyn Sensor>>,
    /// Id counter
    ids: SensorIdAllocator,
    /// Descriptor driven construction
    factory: SensorFactory,
    /// Where failures are reported
    sink: SharedSink,
}

impl Manager {
    /// Manager whose noise models draw from OS entropy
    pub fn new(sink: SharedSink) -> Self {
        Self::with_factory(SensorFactory::new(sink.clone()), sink)
    }

    /// Manager with reproducible noise models
    pub fn with_seed(seed: u64, sink: SharedSink) -> Self {
        Self::with_factory(SensorFactory::with_seed(seed, sink.clone()), sink)
    }

    fn with_factory(factory: SensorFactory, sink: SharedSink) -> Self {
        Self {
            sensors: BTreeMap::new(),
            ids: SensorIdAllocator::new(),
            factory,
            sink,
        }
    }

    /// Nothing to set up; kept for symmetry with the sensor lifecycle.
    pub fn init(&mut self) -> bool {
        info!(sensors = self.sensors.len(), "manager initialized");
        true
    }

    /// Take ownership of a sensor and assign its id.
    ///
    /// Returns [`NO_SENSOR`] (and reports a diagnostic) for `None` or for a
    /// sensor that already has an id.
    pub fn add_sensor(&mut self, sensor: Option<Box<dyn Sensor>>) -> SensorId {
        match sensor.ok_or(ManagerError::NullSensor) {
            Ok(sensor) => self.try_add_sensor(sensor).unwrap_or_else(|e| self.rejected(e)),
            Err(e) => self.rejected(e),
        }
    }

    /// Like [`add_sensor`](Self::add_sensor) but hands back the error.
    #[instrument(
        name = "manager_add_sensor",
        skip(self, sensor),
        fields(sensor_name = %sensor.name(), kind = %sensor.kind())
    )]
    pub fn try_add_sensor(&mut self, mut sensor: Box<dyn Sensor>) -> Result<SensorId> {
        if sensor.id().is_valid() {
            return Err(ManagerError::AlreadyRegistered {
                name: sensor.name().to_string(),
                id: sensor.id(),
            });
        }

        let id = self.ids.allocate();
        if !id.is_valid() || !sensor.base_mut().assign_id(id) {
            return Err(ManagerError::IdSpaceExhausted);
        }

        self.sensors.insert(id, sensor);
        observability::record_registered_sensors(self.sensors.len());
        debug!(%id, "sensor registered");
        Ok(id)
    }

    /// Register a concrete sensor value.
    pub fn register<S: Sensor>(&mut self, sensor: S) -> SensorId {
        self.add_sensor(Some(Box::new(sensor)))
    }

    /// Build a `T` from `descriptor` and register it.
    ///
    /// Returns the registered sensor, `None` if construction or registration
    /// failed.
    pub fn create_sensor<T: Sensor + Default>(&mut self, descriptor: &SensorDescriptor) -> Option<&mut T> {
        let sensor = self.factory.create_sensor::<T>(descriptor)?;
        let id = self.add_sensor(Some(sensor));
        if !id.is_valid() {
            return None;
        }
        self.sensor_as_mut::<T>(id)
    }

    /// Build whichever built-in sensor the descriptor kind names and
    /// register it.
    pub fn create_from_descriptor(&mut self, descriptor: &SensorDescriptor) -> SensorId {
        match self.factory.create_dyn(descriptor) {
            Some(sensor) => self.add_sensor(Some(sensor)),
            None => self.rejected(ManagerError::CreationFailed {
                name: descriptor.name.clone(),
            }),
        }
    }

    pub fn sensor(&self, id: SensorId) -> Option<&dyn Sensor> {
        let sensor = self.sensors.get(&id)?;
        Some(&**sensor)
    }

    pub fn sensor_mut(&mut self, id: SensorId) -> Option<&mut dyn Sensor> {
        let sensor = self.sensors.get_mut(&id)?;
        Some(&mut **sensor)
    }

    /// Typed lookup, `None` when absent or of another type
    pub fn sensor_as<T: Sensor>(&self, id: SensorId) -> Option<&T> {
        self.sensors.get(&id)?.downcast_ref::<T>()
    }

    pub fn sensor_as_mut<T: Sensor>(&mut self, id: SensorId) -> Option<&mut T> {
        self.sensors.get_mut(&id)?.downcast_mut::<T>()
    }

    /// Destroy the sensor with `id`; `false` if there is none.
    pub fn remove(&mut self, id: SensorId) -> bool {
        let removed = self.sensors.remove(&id);
        if let Some(sensor) = &removed {
            debug!(%id, sensor_name = %sensor.name(), "sensor removed");
            observability::record_registered_sensors(self.sensors.len());
        }
        removed.is_some()
    }

    /// Step every sensor that is due at `now`, or all of them when `force`.
    ///
    /// A failing sensor is reported and keeps its previous update time; the
    /// rest of the pass continues.
    #[instrument(
        level = "trace",
        name = "manager_run_once",
        skip(self),
        fields(sensors = self.sensors.len())
    )]
    pub fn run_once(&mut self, now: SimTime, force: bool) -> RunOnceReport {
        let started = Instant::now();
        let mut report = RunOnceReport::default();

        for (&id, sensor) in self.sensors.iter_mut() {
            if !force && !is_due(&**sensor, now) {
                report.skipped += 1;
                continue;
            }

            match sensor.update(now) {
                Ok(()) => {
                    sensor.base_mut().set_last_update_time(now);
                    report.updated += 1;
                }
                Err(source) => {
                    report.failed += 1;
                    let e = ManagerError::UpdateFailed {
                        id,
                        name: sensor.name().to_string(),
                        source,
                    };
                    warn!(%id, error = %e, "sensor update failed");
                    observability::record_update_failure(sensor.name(), sensor.kind().as_str());
                    self.sink.report(Diagnostic::error(COMPONENT, e.to_string()));
                }
            }
        }

        observability::record_run_once(&report, started.elapsed().as_secs_f64() * 1000.0);
        report
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> Vec<SensorId> {
        self.sensors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Sensor> + '_ {
        self.sensors.values().map(|sensor| &**sensor as &dyn Sensor)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Sensor>> + '_ {
        self.sensors.values_mut()
    }

    /// Factory used by the descriptor driven paths
    pub fn factory_mut(&mut self) -> &mut SensorFactory {
        &mut self.factory
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    fn rejected(&self, e: ManagerError) -> SensorId {
        warn!(error = %e, "sensor not registered");
        observability::record_registration_rejected();
        self.sink.report(Diagnostic::error(COMPONENT, e.to_string()));
        NO_SENSOR
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(TracingSink::shared())
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("sensors", &self.sensors.len())
            .field("ids_issued", &self.ids.issued())
            .finish_non_exhaustive()
    }
}

/// Whether `sensor` should update at `now`.
///
/// Due when its rate is 0, when it never updated, or when at least one
/// period has passed since its last update. Never due while `now` lies
/// before the last update.
pub fn is_due(sensor: &dyn Sensor, now: SimTime) -> bool {
    let rate = sensor.update_rate();
    if is_every_tick(rate) {
        return true;
    }
    match sensor.last_update_time() {
        None => true,
        Some(last) => now
            .checked_sub(last)
            .is_some_and(|elapsed| period_elapsed(elapsed, rate)),
    }
}
