//! vmc-osc/src/timestamp.rs
//!
//! Session clock for `/VMC/Ext/T`. Elapsed time is measured on the
//! monotonic clock so it never runs backwards; the wall-clock start is kept
//! for logging only.

use crate::geometry::round_to;
use std::time::{Instant, SystemTime};

/// Digits after the decimal point used by [`Timestamp::elapsed`].
pub const DEFAULT_PRECISION: u32 = 6;

#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    started: Instant,
    wall_clock: SystemTime,
}

impl Timestamp {
    pub fn now() -> Self {
        Self {
            started: Instant::now(),
            wall_clock: SystemTime::now(),
        }
    }

    /// Seconds since this timestamp was taken, plus `offset`, rounded to
    /// `precision` digits.
    ///
    /// `offset` carries a session's elapsed time across process restarts
    /// when the caller persists the last delta somewhere.
    pub fn delta(&self, offset: f64, precision: u32) -> f64 {
        round_to(offset + self.started.elapsed().as_secs_f64(), precision)
    }

    /// [`Timestamp::delta`] with no offset and the default precision.
    pub fn elapsed(&self) -> f64 {
        self.delta(0.0, DEFAULT_PRECISION)
    }

    /// Wall-clock instant at which the timestamp was taken.
    pub fn started_at(&self) -> SystemTime {
        self.wall_clock
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
