//! Error types for the configuration and collaborator boundaries.
//!
//! The control core itself never fails: undefined telemetry is folded into
//! conservative defaults. Errors only exist where the crate talks to the
//! outside world.

use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.steps_per_day"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A collaborator refused a value written by the controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("{component} rejected {value} W: {reason}")]
    Rejected {
        component: String,
        value: i32,
        reason: String,
    },
}

/// Unknown relay wiring scheme name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown relay wiring scheme \"{0}\"")]
pub struct ParseSchemeError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_names_field() {
        let e = ConfigError::new("simulation.days", "must be > 0");
        assert_eq!(e.to_string(), "config error: simulation.days: must be > 0");
    }

    #[test]
    fn write_error_display() {
        let e = WriteError::Rejected {
            component: "pvInverter0".into(),
            value: 1200,
            reason: "read-only".into(),
        };
        assert_eq!(e.to_string(), "pvInverter0 rejected 1200 W: read-only");
    }
}
