//! SensorId - Opaque registration handle
//!
//! Ids are handed out by a [`SensorIdAllocator`] owned by the registry. The
//! counter only ever moves forward, so an id that has been issued once is
//! never issued again, even after the sensor it named was removed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor identifier.
///
/// A thin `Copy` wrapper over `u64`. The value `0` is reserved for
/// [`NO_SENSOR`] and is never produced by an allocator.
///
/// # Examples
/// ```
/// use contracts::{SensorIdAllocator, NO_SENSOR};
///
/// let mut ids = SensorIdAllocator::new();
/// let first = ids.allocate();
/// let second = ids.allocate();
/// assert_ne!(first, second);
/// assert_ne!(first, NO_SENSOR);
/// assert!(first < second);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(u64);

/// Sentinel meaning "no sensor" / registration failure.
pub const NO_SENSOR: SensorId = SensorId(0);

impl SensorId {
    /// Wrap a raw id value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// `false` only for [`NO_SENSOR`].
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != NO_SENSOR.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "SensorId({})", self.0)
        } else {
            write!(f, "NO_SENSOR")
        }
    }
}

impl From<SensorId> for u64 {
    #[inline]
    fn from(id: SensorId) -> Self {
        id.0
    }
}

/// Monotonic id source.
///
/// Returns [`NO_SENSOR`] once the id space is exhausted instead of wrapping.
#[derive(Debug, Clone)]
pub struct SensorIdAllocator {
    next: u64,
}

impl SensorIdAllocator {
    /// Allocator whose first id is `1`.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next unused id.
    pub fn allocate(&mut self) -> SensorId {
        if self.next == u64::MAX {
            return NO_SENSOR;
        }
        let id = SensorId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SensorIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
