use super::types::SimConfig;

/// One control period handed out by the [`Clock`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Step index, starting at 0.
    pub step: usize,
    /// Simulated time at the start of the step, in hours.
    pub time_hr: f32,
}

/// Fixed-period scheduler clock covering a whole simulation run.
///
/// # Examples
///
/// ```
/// use para14a::sim::clock::Clock;
/// use para14a::sim::types::SimConfig;
///
/// let mut clock = Clock::new(&SimConfig::new(4, 1, 0));
/// let mut hours = Vec::new();
///
/// clock.run(|tick| hours.push(tick.time_hr));
/// assert_eq!(hours, vec![0.0, 6.0, 12.0, 18.0]);
/// ```
pub struct Clock {
    current: usize,
    total: usize,
    dt_hours: f32,
}

impl Clock {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            current: 0,
            total: config.total_steps(),
            dt_hours: config.dt_hours,
        }
    }

    /// Returns the next tick, or `None` once the run is complete.
    pub fn tick(&mut self) -> Option<Tick> {
        if self.current >= self.total {
            return None;
        }
        let step = self.current;
        self.current += 1;
        Some(Tick {
            step,
            time_hr: step as f32 * self.dt_hours,
        })
    }

    /// Steps not handed out yet.
    pub fn remaining(&self) -> usize {
        self.total - self.current
    }

    /// Calls `f` for every remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }
}
