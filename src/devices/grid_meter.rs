use crate::devices::types::GridMeter;

/// Grid meter reporting the net power balance of the last simulation step.
#[derive(Debug, Clone)]
pub struct SimGridMeter {
    id: String,
    active_power_w: Option<i32>,
}

impl SimGridMeter {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active_power_w: None,
        }
    }

    /// Stores a reading; `None` emulates a meter without a value.
    pub fn record(&mut self, active_power_w: Option<i32>) {
        self.active_power_w = active_power_w;
    }
}

impl GridMeter for SimGridMeter {
    fn id(&self) -> &str {
        &self.id
    }

    fn active_power_w(&self) -> Option<i32> {
        self.active_power_w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_until_recorded() {
        let mut meter = SimGridMeter::new("meter0");
        assert_eq!(meter.active_power_w(), None);
        meter.record(Some(-2_500));
        assert_eq!(meter.active_power_w(), Some(-2_500));
    }
}
