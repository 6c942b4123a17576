//! PV production limit: regulatory ceiling with grid feedback, smoothing,
//! ramp limiting and proportional apportioning across inverters.

use tracing::debug;

use super::level::ProductionLevel;
use super::mean::WeightedMovingAverage;
use super::ramp::{RampController, RampStep};
use super::types::{InverterLimit, PvInverterEntry};

/// Result of one production limit calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionLimits {
    /// Per-inverter limits, in inverter order.
    pub limits: Vec<InverterLimit>,
    /// Accepted aggregate limit, `None` while production is unrestricted.
    pub applied_sum_w: Option<i32>,
    pub hardware_sum_w: i32,
}

/// Sum of the configured hardware maxima, saturating at `i32::MAX`.
pub fn hardware_sum(inverters: &[PvInverterEntry]) -> i32 {
    let sum: i64 = inverters
        .iter()
        .map(|inv| i64::from(inv.hardware_max_w.max(0)))
        .sum();
    clamp_i32(sum, 0, i32::MAX)
}

/// Unsmoothed, unramped target:
/// `floor(hardware_sum * factor / 100) + grid + pv_sum`, clamped to
/// `[0, hardware_sum]`.
pub fn raw_target(level: ProductionLevel, hardware_sum: i32, grid_w: i32, pv_sum_w: i32) -> i32 {
    let ceiling = i64::from(hardware_sum) * i64::from(level.percent_factor()) / 100;
    let target = ceiling + i64::from(grid_w) + i64::from(pv_sum_w);
    clamp_i32(target, 0, hardware_sum.max(0))
}

/// Splits `applied_sum` across inverters proportionally to hardware capacity.
pub fn apportion(
    applied_sum: i32,
    inverters: &[PvInverterEntry],
    hardware_sum: i32,
) -> Vec<InverterLimit> {
    inverters
        .iter()
        .map(|inv| {
            let limit_w = if hardware_sum <= 0 {
                0
            } else {
                let share = i64::from(applied_sum) * i64::from(inv.hardware_max_w)
                    / i64::from(hardware_sum);
                clamp_i32(share, 0, inv.hardware_max_w.max(0))
            };
            InverterLimit {
                id: inv.id.clone(),
                limit_w,
            }
        })
        .collect()
}

fn clamp_i32(value: i64, min: i32, max: i32) -> i32 {
    // bounds are i32 so the cast is lossless
    value.clamp(i64::from(min), i64::from(max)) as i32
}

/// Stateful production limit calculator.
#[derive(Debug, Clone, Default)]
pub struct ProductionLimitCalculator {
    ramp: RampController,
    smoothing: Option<WeightedMovingAverage>,
}

impl ProductionLimitCalculator {
    /// Creates a calculator smoothing the target with `weights`.
    ///
    /// An empty weight list disables smoothing.
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            ramp: RampController::new(),
            smoothing: (!weights.is_empty()).then(|| WeightedMovingAverage::new(weights)),
        }
    }

    pub fn ramp(&self) -> &RampController {
        &self.ramp
    }

    /// Last accepted aggregate limit.
    pub fn last_limit_sum(&self) -> Option<i32> {
        self.ramp.last()
    }

    /// Computes this cycle's limits.
    ///
    /// # Arguments
    ///
    /// * `level` - Decoded production management level
    /// * `inverters` - Configured inverters
    /// * `grid_w` - Grid active power, import positive
    /// * `pv_sum_w` - Sum of current PV active power
    pub fn calculate(
        &mut self,
        level: ProductionLevel,
        inverters: &[PvInverterEntry],
        grid_w: i32,
        pv_sum_w: i32,
    ) -> ProductionLimits {
        let hardware_sum_w = hardware_sum(inverters);

        if inverters.is_empty() {
            self.reset();
            return ProductionLimits {
                limits: Vec::new(),
                applied_sum_w: level.is_limiting().then_some(0),
                hardware_sum_w,
            };
        }

        if !level.is_limiting() {
            self.ramp.settle(hardware_sum_w);
            if let Some(smoothing) = self.smoothing.as_mut() {
                smoothing.reset();
            }
            let limits = inverters
                .iter()
                .map(|inv| InverterLimit {
                    id: inv.id.clone(),
                    limit_w: inv.hardware_max_w,
                })
                .collect();
            return ProductionLimits {
                limits,
                applied_sum_w: None,
                hardware_sum_w,
            };
        }

        let target = raw_target(level, hardware_sum_w, grid_w, pv_sum_w);
        let smoothed = self.smooth(target, hardware_sum_w);

        let step = self.ramp.step(smoothed, hardware_sum_w);
        let applied = step.value();
        debug!(
            %level,
            hardware_sum_w,
            grid_w,
            pv_sum_w,
            target,
            smoothed,
            applied,
            held = matches!(step, RampStep::Held(_)),
            "pv limit"
        );

        ProductionLimits {
            limits: apportion(applied, inverters, hardware_sum_w),
            applied_sum_w: Some(applied),
            hardware_sum_w,
        }
    }

    /// Smooths rising targets only.
    ///
    /// A target below the last accepted sum goes to the ramp unchanged and
    /// reseeds the window, so a stricter level is never delayed by history.
    /// A rising target is damped but stays within `[last, target]`.
    fn smooth(&mut self, target: i32, hardware_sum_w: i32) -> i32 {
        let Some(smoothing) = self.smoothing.as_mut() else {
            return target;
        };
        match self.ramp.last() {
            Some(last) if target > last => {
                smoothing.push(f64::from(target));
                // mean of values in [0, hardware_sum]
                let mean = (smoothing.mean().round() as i32).clamp(0, hardware_sum_w);
                mean.clamp(last, target)
            }
            _ => {
                smoothing.reset();
                smoothing.push(f64::from(target));
                target
            }
        }
    }

    pub fn reset(&mut self) {
        self.ramp.reset();
        if let Some(smoothing) = self.smoothing.as_mut() {
            smoothing.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::mean::DEFAULT_WEIGHTS;

    fn single(hardware_max_w: i32, active_power_w: i32) -> Vec<PvInverterEntry> {
        vec![PvInverterEntry::new("pvInverter0", hardware_max_w).with_active_power(active_power_w)]
    }

    fn default_calculator() -> ProductionLimitCalculator {
        ProductionLimitCalculator::new(DEFAULT_WEIGHTS.to_vec())
    }

    #[test]
    fn test_raw_target_reduced60() {
        assert_eq!(raw_target(ProductionLevel::Reduced60, 20_000, -3_000, 1_000), 10_000);
    }

    #[test]
    fn test_raw_target_clamped() {
        assert_eq!(raw_target(ProductionLevel::Off, 20_000, -3_000, 1_000), 0);
        assert_eq!(raw_target(ProductionLevel::Reduced60, 20_000, 15_000, 1_000), 20_000);
    }

    #[test]
    fn test_full_gives_hardware_max_and_no_limit() {
        let mut calc = default_calculator();
        let out = calc.calculate(ProductionLevel::Full, &single(20_000, 1_000), 0, 1_000);
        assert_eq!(out.applied_sum_w, None);
        assert_eq!(out.limits[0].limit_w, 20_000);
        assert_eq!(calc.last_limit_sum(), Some(20_000));
    }

    #[test]
    fn test_reduced60_first_cycle_hits_target() {
        let mut calc = default_calculator();
        let inverters = single(20_000, 1_000);
        let out = calc.calculate(ProductionLevel::Reduced60, &inverters, -3_000, 1_000);
        assert_eq!(out.applied_sum_w, Some(10_000));
        assert_eq!(out.limits[0].limit_w, 10_000);
    }

    #[test]
    fn test_switch_from_full_ramps_down() {
        let mut calc = default_calculator();
        let inverters = single(20_000, 1_000);
        calc.calculate(ProductionLevel::Full, &inverters, 0, 1_000);
        let out = calc.calculate(ProductionLevel::Reduced60, &inverters, -3_000, 1_000);
        // half of the 10 kW gap
        assert_eq!(out.applied_sum_w, Some(15_000));
        let out = calc.calculate(ProductionLevel::Reduced60, &inverters, -3_000, 1_000);
        assert_eq!(out.applied_sum_w, Some(12_500));
    }

    #[test]
    fn test_lower_target_while_restricted_halves_gap() {
        let mut calc = default_calculator();
        let inverters = single(20_000, 0);
        // raw target 14000
        let out = calc.calculate(ProductionLevel::Reduced60, &inverters, 2_000, 0);
        assert_eq!(out.applied_sum_w, Some(14_000));
        // raw target 10000
        let out = calc.calculate(ProductionLevel::Reduced60, &inverters, -2_000, 0);
        assert_eq!(out.applied_sum_w, Some(12_000));
        let out = calc.calculate(ProductionLevel::Reduced60, &inverters, -2_000, 0);
        assert_eq!(out.applied_sum_w, Some(11_000));
    }

    #[test]
    fn test_stricter_level_ignores_smoothing_history() {
        let mut calc = default_calculator();
        let inverters = single(20_000, 0);
        for _ in 0..10 {
            calc.calculate(ProductionLevel::Reduced60, &inverters, 0, 0);
        }
        assert_eq!(calc.last_limit_sum(), Some(12_000));
        let out = calc.calculate(ProductionLevel::Reduced30, &inverters, 0, 0);
        assert_eq!(out.applied_sum_w, Some(9_000));
        let out = calc.calculate(ProductionLevel::Off, &inverters, 0, 0);
        // Off bypasses the ramp
        assert_eq!(out.applied_sum_w, Some(0));
    }

    #[test]
    fn test_rising_target_never_exceeds_ramp_step() {
        let mut calc = default_calculator();
        let inverters = single(20_000, 0);
        calc.calculate(ProductionLevel::Reduced30, &inverters, 0, 0);
        let out = calc.calculate(ProductionLevel::Reduced60, &inverters, 0, 0);
        let applied = out.applied_sum_w.unwrap_or(0);
        // 6000 -> 12000, at most a fifth of the gap
        assert!(applied > 6_000 && applied <= 7_200, "applied {applied}");
    }

    #[test]
    fn test_converged_cycle_is_fixed_point() {
        let mut calc = default_calculator();
        let inverters = single(20_000, 1_000);
        let first = calc.calculate(ProductionLevel::Reduced30, &inverters, -1_000, 1_000);
        for _ in 0..20 {
            let next = calc.calculate(ProductionLevel::Reduced30, &inverters, -1_000, 1_000);
            assert_eq!(next, first);
        }
    }

    #[test]
    fn test_apportion_proportional_to_hardware() {
        let inverters = vec![
            PvInverterEntry::new("pv0", 10_000),
            PvInverterEntry::new("pv1", 5_000),
            PvInverterEntry::new("pv2", 0),
        ];
        let limits = apportion(9_000, &inverters, 15_000);
        let watts: Vec<i32> = limits.iter().map(|l| l.limit_w).collect();
        assert_eq!(watts, vec![6_000, 3_000, 0]);
    }

    #[test]
    fn test_zero_inverters_creates_no_ramp_state() {
        let mut calc = default_calculator();
        let out = calc.calculate(ProductionLevel::Reduced60, &[], -3_000, 0);
        assert!(out.limits.is_empty());
        assert_eq!(out.hardware_sum_w, 0);
        assert_eq!(calc.last_limit_sum(), None);
    }

    #[test]
    fn test_zero_hardware_gives_zero_limits() {
        let mut calc = default_calculator();
        let out = calc.calculate(ProductionLevel::Reduced60, &single(0, 0), 500, 0);
        assert_eq!(out.limits[0].limit_w, 0);
    }

    #[test]
    fn test_without_smoothing_follows_ramp_only() {
        let mut calc = ProductionLimitCalculator::new(Vec::new());
        let inverters = single(20_000, 0);
        calc.calculate(ProductionLevel::Reduced60, &inverters, 0, 0);
        let out = calc.calculate(ProductionLevel::Reduced30, &inverters, 0, 0);
        // 12000 -> 6000, half the gap
        assert_eq!(out.applied_sum_w, Some(9_000));
    }
}
