//! Simulated digital input board driven by a restriction schedule.

use std::collections::HashMap;

use crate::devices::types::RelaySource;

/// A window of steps during which relay channels change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayWindow {
    /// Start timestep (inclusive).
    pub start_step: usize,
    /// End timestep (exclusive).
    pub end_step: usize,
    /// Channels closed while the window is active.
    pub closed: Vec<String>,
    /// Channels without a value while the window is active.
    pub undefined: Vec<String>,
}

impl RelayWindow {
    /// Creates a window spanning `[start_step, end_step)`.
    ///
    /// # Panics
    ///
    /// Panics if `start_step >= end_step`.
    pub fn new(start_step: usize, end_step: usize, closed: Vec<String>) -> Self {
        assert!(start_step < end_step);
        Self {
            start_step,
            end_step,
            closed,
            undefined: Vec::new(),
        }
    }

    pub fn with_undefined(mut self, undefined: Vec<String>) -> Self {
        self.undefined = undefined;
        self
    }

    /// Returns `true` when `timestep` falls within the window.
    pub fn is_active(&self, timestep: usize) -> bool {
        timestep >= self.start_step && timestep < self.end_step
    }
}

/// Relay inputs of a simulated I/O board.
///
/// Known channels read open (`false`) unless an active window closes them or
/// marks them undefined. Unknown addresses always read `None`.
#[derive(Debug, Clone, Default)]
pub struct RelayBoard {
    windows: Vec<RelayWindow>,
    state: HashMap<String, Option<bool>>,
}

impl RelayBoard {
    pub fn new(channels: impl IntoIterator<Item = String>, windows: Vec<RelayWindow>) -> Self {
        Self {
            windows,
            state: channels.into_iter().map(|c| (c, Some(false))).collect(),
        }
    }

    /// Applies the schedule for `timestep`.
    pub fn advance(&mut self, timestep: usize) {
        for value in self.state.values_mut() {
            *value = Some(false);
        }
        for window in self.windows.iter().filter(|w| w.is_active(timestep)) {
            for channel in &window.closed {
                if let Some(value) = self.state.get_mut(channel) {
                    *value = Some(true);
                }
            }
            for channel in &window.undefined {
                if let Some(value) = self.state.get_mut(channel) {
                    *value = None;
                }
            }
        }
    }

    /// Addresses of the channels currently closed, sorted.
    pub fn closed_channels(&self) -> Vec<&str> {
        let mut closed: Vec<&str> = self
            .state
            .iter()
            .filter(|(_, v)| **v == Some(true))
            .map(|(k, _)| k.as_str())
            .collect();
        closed.sort_unstable();
        closed
    }
}

impl RelaySource for RelayBoard {
    fn read_relay(&self, address: &str) -> Option<bool> {
        self.state.get(address).copied().flatten()
    }
}
