//! Ramp limiting of the aggregate PV limit between control cycles.
//!
//! Decreases are applied fast (half the gap per cycle), increases slowly
//! (a fifth of the gap). Small increases below a deadband relative to the
//! hardware capacity are held back until they persist for several cycles.

use tracing::debug;

/// Targets at or below this value bypass ramp limiting entirely.
pub const RAMP_THRESHOLD_W: i32 = 100;

/// An increase smaller than `hardware_sum / LITTLE_DIFF_DIVISOR` counts as small.
pub const LITTLE_DIFF_DIVISOR: i64 = 200;

/// Consecutive small increases after which the target is applied as is.
pub const LITTLE_DIFF_PATIENCE: u32 = 5;

const RISE_DIVISOR: i64 = 5;
const FALL_DIVISOR: i64 = 2;

/// Outcome of one ramp step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStep {
    /// The returned sum is the new accepted limit.
    Applied(i32),
    /// A small increase was held back; the previous sum stays in force.
    Held(i32),
}

impl RampStep {
    pub const fn value(self) -> i32 {
        match self {
            Self::Applied(v) | Self::Held(v) => v,
        }
    }
}

/// Cross-cycle ramp state: last accepted sum and the small-increase streak.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RampController {
    last: Option<i32>,
    little_diff_streak: u32,
}

impl RampController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last accepted sum, `None` before the first step or after a reset.
    pub fn last(&self) -> Option<i32> {
        self.last
    }

    pub fn little_diff_streak(&self) -> u32 {
        self.little_diff_streak
    }

    /// Moves the accepted sum toward `target`.
    ///
    /// The first step after construction or [`reset`](Self::reset) accepts
    /// the target directly. Never overshoots the target. The small-increase
    /// streak only restarts once an increase is applied.
    pub fn step(&mut self, target: i32, hardware_sum: i32) -> RampStep {
        let Some(last) = self.last else {
            return self.accept(target);
        };
        if target <= RAMP_THRESHOLD_W {
            return self.accept(target);
        }

        let last_w = i64::from(last);
        let target_w = i64::from(target);
        let diff = (target_w - last_w).abs();

        if target_w <= last_w {
            // rounded up so that a 1 W gap still closes
            let applied = (last_w - (diff + FALL_DIVISOR - 1) / FALL_DIVISOR).max(target_w);
            // applied lies between target and last, both i32
            return self.accept(applied as i32);
        }

        let applied = if diff < i64::from(hardware_sum) / LITTLE_DIFF_DIVISOR {
            self.little_diff_streak += 1;
            if self.little_diff_streak < LITTLE_DIFF_PATIENCE {
                debug!(
                    target,
                    last,
                    streak = self.little_diff_streak,
                    "holding small limit increase"
                );
                return RampStep::Held(last);
            }
            target_w
        } else {
            (last_w + (diff / RISE_DIVISOR).max(1)).min(target_w)
        };

        self.little_diff_streak = 0;
        // applied lies between last and target, both i32
        self.accept(applied as i32)
    }

    /// Marks `value` as the accepted sum without ramping and restarts the
    /// small-increase streak, e.g. while production is unrestricted.
    pub fn settle(&mut self, value: i32) {
        self.last = Some(value);
        self.little_diff_streak = 0;
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.little_diff_streak = 0;
    }

    fn accept(&mut self, value: i32) -> RampStep {
        self.last = Some(value);
        RampStep::Applied(value)
    }
}
