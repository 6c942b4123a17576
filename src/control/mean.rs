//! Fixed-window weighted moving average used to smooth power targets.

use std::collections::VecDeque;

/// Default smoothing weights, oldest sample first.
pub const DEFAULT_WEIGHTS: [f64; 10] = [15.0, 15.0, 15.0, 15.0, 20.0, 30.0, 40.0, 50.0, 60.0, 75.0];

/// Band around the current mean inside which a biased push counts once.
const BIAS_BAND: f64 = 0.1;

/// Weighted moving average over the last `weights.len()` samples.
///
/// The first push fills the whole window with that value, so the filter starts
/// settled at the first observation instead of ramping up from zero.
#[derive(Debug, Clone)]
pub struct WeightedMovingAverage {
    weights: Vec<f64>,
    samples: VecDeque<f64>,
}

impl WeightedMovingAverage {
    /// Creates an empty average. `weights[0]` applies to the oldest sample.
    pub fn new(weights: Vec<f64>) -> Self {
        let capacity = weights.len();
        Self {
            weights,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(DEFAULT_WEIGHTS.to_vec())
    }

    /// Window length.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// `true` until the first push and again after [`reset`](Self::reset).
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, value: f64) {
        if self.samples.is_empty() {
            self.samples.extend(std::iter::repeat_n(value, self.weights.len()));
            return;
        }
        self.samples.push_back(value);
        while self.samples.len() > self.weights.len() {
            self.samples.pop_front();
        }
    }

    /// Pushes `value` `above` times if it exceeds the current mean by more
    /// than 10%, `below` times if it falls short by more than 10%, and once
    /// otherwise.
    pub fn push_biased(&mut self, value: f64, above: usize, below: usize) {
        if self.samples.is_empty() {
            self.push(value);
            return;
        }

        let mean = self.mean();
        let repeat = if value > mean * (1.0 + BIAS_BAND) {
            above
        } else if value < mean * (1.0 - BIAS_BAND) {
            below
        } else {
            1
        };
        for _ in 0..repeat {
            self.push(value);
        }
    }

    /// `Σ(sample·weight) / Σ(weight)`, or 0 when nothing was pushed.
    pub fn mean(&self) -> f64 {
        let weight_sum: f64 = self.weights.iter().sum();
        if self.samples.is_empty() || weight_sum <= 0.0 {
            return 0.0;
        }

        let weighted: f64 = self
            .samples
            .iter()
            .zip(&self.weights)
            .map(|(sample, weight)| sample * weight)
            .sum();
        weighted / weight_sum
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

impl Default for WeightedMovingAverage {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
