//! Power budget for controllable consumers (EVCS clusters).

use tracing::debug;

use super::level::ConsumptionLevel;

/// Budget sentinel meaning "no restriction".
pub const UNLIMITED: i32 = -1;

/// Guaranteed power for a single charging station.
pub const BASE_MINIMUM_POWER_W: i32 = 4200;

/// Watts per simultaneity percent point for each additional station.
pub const MINIMUM_POWER_PER_PERCENT_W: i32 = 42;

/// Simultaneity factor in percent for `evcs_count` stations.
pub const fn simultaneity_factor(evcs_count: u32) -> i32 {
    match evcs_count {
        0 | 1 => 0,
        2 => 80,
        3 => 75,
        4 => 70,
        5 => 65,
        6 => 60,
        7 => 55,
        8 => 50,
        _ => 45,
    }
}

/// Regulatory minimum power:
/// `4200 + (n - 1) * simultaneity_factor(n) * 42`.
pub fn minimum_power_w(evcs_count: u32) -> i32 {
    let additional = i64::from(evcs_count.saturating_sub(1));
    let power = i64::from(BASE_MINIMUM_POWER_W)
        + additional
            * i64::from(simultaneity_factor(evcs_count))
            * i64::from(MINIMUM_POWER_PER_PERCENT_W);
    i32::try_from(power).unwrap_or(i32::MAX)
}

/// Budget for this cycle, [`UNLIMITED`] when consumption is not restricted.
///
/// Depends only on the current cycle's inputs, so a stricter level applies
/// in full on its first cycle.
pub fn budget(level: ConsumptionLevel, evcs_count: u32, pv_sum_w: i32) -> i32 {
    let pv_sum_w = pv_sum_w.max(0);
    let budget = match level {
        ConsumptionLevel::Full => UNLIMITED,
        ConsumptionLevel::Reduced => minimum_power_w(evcs_count).saturating_add(pv_sum_w),
        ConsumptionLevel::Off => pv_sum_w,
        ConsumptionLevel::Unused => 0,
    };
    debug!(%level, evcs_count, pv_sum_w, budget, "evcs budget");
    budget
}
