//! Simulation clock types

use std::time::Duration;

/// Simulation time elapsed since the simulation started.
///
/// Integer nanoseconds, so comparisons against an update period are exact.
pub type SimTime = Duration;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Whether `rate_hz` means "update on every tick" (`<= 0` or not finite).
pub fn is_every_tick(rate_hz: f64) -> bool {
    !rate_hz.is_finite() || rate_hz <= 0.0
}

/// Whether `elapsed` covers at least one full period `1 / rate_hz`.
///
/// Evaluated as `elapsed_ns · rate >= 10⁹` so the period is neither truncated
/// to whole nanoseconds nor lost when `1 / rate_hz` exceeds `Duration::MAX`.
/// Always `true` for every-tick rates.
pub fn period_elapsed(elapsed: Duration, rate_hz: f64) -> bool {
    if is_every_tick(rate_hz) {
        return true;
    }
    elapsed.as_nanos() as f64 * rate_hz >= NANOS_PER_SEC
}
