//! Site power balance at the grid connection point.

/// Net grid power from device outputs, all in the same sign convention.
///
/// - Positive = consumption (household, EVCS clusters)
/// - Negative = generation (PV inverters)
///
/// Pure summation, no sign flipping. The result is what the grid meter
/// reads: positive imports, negative exports.
pub fn grid_net_w(household_w: i32, evcs_w: i32, pv_w: i32) -> i32 {
    let net = i64::from(household_w) + i64::from(evcs_w) + i64::from(pv_w);
    net.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
