//! Discrete management levels decoded from the grid operator's relay inputs.

use std::fmt;

use serde::Serialize;

/// How much of the installed PV capacity may be fed in.
///
/// The default is [`ProductionLevel::Off`], the most restrictive level, so a
/// freshly activated or reset controller never starts out permissive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionLevel {
    /// No restriction.
    Full,
    /// 60% of hardware capacity.
    Reduced60,
    /// 30% of hardware capacity.
    Reduced30,
    /// No feed-in.
    #[default]
    Off,
}

impl ProductionLevel {
    /// Multiplier (in percent) applied to the aggregate hardware capacity.
    pub const fn percent_factor(self) -> i32 {
        match self {
            Self::Full => 100,
            Self::Reduced60 => 60,
            Self::Reduced30 => 30,
            Self::Off => 0,
        }
    }

    /// Whether the level requires an active power limit on the inverters.
    pub const fn is_limiting(self) -> bool {
        !matches!(self, Self::Full)
    }

    /// Channel code published on the status channel.
    pub const fn code(self) -> u8 {
        match self {
            Self::Full => 3,
            Self::Reduced60 => 2,
            Self::Reduced30 => 1,
            Self::Off => 0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Full => "No limit",
            Self::Reduced60 => "Reduced 60%",
            Self::Reduced30 => "Reduced 30%",
            Self::Off => "Off",
        }
    }
}

impl fmt::Display for ProductionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much power controllable consumers (EV charging stations) may draw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionLevel {
    /// No restriction; the budget is [`UNLIMITED`](super::consumption::UNLIMITED).
    Full,
    /// Guaranteed minimum power plus own PV production.
    Reduced,
    /// Code reserved by the FNN 2-bit scheme; nothing may be drawn.
    Unused,
    /// Only own PV production may be consumed.
    #[default]
    Off,
}

impl ConsumptionLevel {
    /// Channel code published on the status channel.
    pub const fn code(self) -> u8 {
        match self {
            Self::Full => 3,
            Self::Reduced => 2,
            Self::Unused => 1,
            Self::Off => 0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Full => "No limit",
            Self::Reduced => "Reduced",
            Self::Unused => "Unused",
            Self::Off => "Off",
        }
    }
}

impl fmt::Display for ConsumptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
