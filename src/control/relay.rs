//! Relay wiring schemes and the decoder that maps relay readings onto
//! management levels.
//!
//! Inputs are numbered E1..E4 in configuration order. A reading of `None`
//! means the channel could not be read; any level that depends on such an
//! input falls back to `Off`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use super::level::{ConsumptionLevel, ProductionLevel};
use crate::error::ParseSchemeError;

/// Readings of the four relay inputs E1..E4.
pub type RelayReadings = [Option<bool>; 4];

/// How the relay inputs are wired to the grid operator's control box.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayWiringScheme {
    /// Nothing connected.
    #[default]
    None,
    /// FNN 2-bit, one consumer (E1, E2).
    Fnn2BitOneConsumer,
    /// FNN 2-bit, two consumers (E1, E2).
    Fnn2BitTwoConsumers,
    /// FNN 2-bit, one producer (E1, E2).
    Fnn2BitOneProducer,
    /// FNN 2-bit, two producers (E1, E2).
    Fnn2BitTwoProducers,
    /// FNN 2-bit, consumer on (E1, E2) and producer on (E3, E4).
    Fnn2BitOneConsumerOneProducer,
    /// Three relays 0% / 30% / 60% for one producer.
    ThreeRelayOneProducer,
    /// Four relays 0% / 30% / 60% / 100% for one producer.
    FourRelayOneProducer,
    /// Single contact for four consumers (E1 only).
    SingleContactFourConsumers,
}

impl RelayWiringScheme {
    pub const ALL: [Self; 9] = [
        Self::None,
        Self::Fnn2BitOneConsumer,
        Self::Fnn2BitTwoConsumers,
        Self::Fnn2BitOneProducer,
        Self::Fnn2BitTwoProducers,
        Self::Fnn2BitOneConsumerOneProducer,
        Self::ThreeRelayOneProducer,
        Self::FourRelayOneProducer,
        Self::SingleContactFourConsumers,
    ];

    /// Configuration name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fnn2BitOneConsumer => "fnn_2bit_one_consumer",
            Self::Fnn2BitTwoConsumers => "fnn_2bit_two_consumers",
            Self::Fnn2BitOneProducer => "fnn_2bit_one_producer",
            Self::Fnn2BitTwoProducers => "fnn_2bit_two_producers",
            Self::Fnn2BitOneConsumerOneProducer => "fnn_2bit_one_consumer_one_producer",
            Self::ThreeRelayOneProducer => "three_relay_one_producer",
            Self::FourRelayOneProducer => "four_relay_one_producer",
            Self::SingleContactFourConsumers => "single_contact_four_consumers",
        }
    }

    /// Identifier used in the VDE FNN / grid-operator documents.
    pub const fn fnn_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Fnn2BitOneConsumer => "FNN2bit1StbV",
            Self::Fnn2BitTwoConsumers => "FNN2bit2StbV",
            Self::Fnn2BitOneProducer => "FNN2bit1StbE",
            Self::Fnn2BitTwoProducers => "FNN2bit2StbE",
            Self::Fnn2BitOneConsumerOneProducer => "FNN2bit1StbV1StbE",
            Self::ThreeRelayOneProducer => "DreiRelais1StbE",
            Self::FourRelayOneProducer => "VierRelais1StbE",
            Self::SingleContactFourConsumers => "Einzelkontakt4StbV",
        }
    }

    /// Resolves a configured name, falling back to [`RelayWiringScheme::None`]
    /// for anything unrecognized.
    ///
    /// Returns the scheme and whether the name was recognized.
    pub fn resolve(name: &str) -> (Self, bool) {
        match name.parse() {
            Ok(scheme) => (scheme, true),
            Err(err) => {
                warn!(%err, "relay mode not supported, forcing production and consumption off");
                (Self::None, false)
            }
        }
    }
}

impl FromStr for RelayWiringScheme {
    type Err = ParseSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|scheme| {
                scheme.as_str().eq_ignore_ascii_case(trimmed)
                    || scheme.fnn_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| ParseSchemeError(s.to_string()))
    }
}

impl fmt::Display for RelayWiringScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps the relay readings to (production, consumption) levels.
///
/// Total and side-effect free. A level the scheme does not drive is `Off`.
pub fn decode(
    scheme: RelayWiringScheme,
    readings: RelayReadings,
) -> (ProductionLevel, ConsumptionLevel) {
    let [e1, e2, e3, e4] = readings;

    match scheme {
        RelayWiringScheme::None => (ProductionLevel::Off, ConsumptionLevel::Off),
        RelayWiringScheme::ThreeRelayOneProducer => {
            (production_three_relay(e1, e2, e3), ConsumptionLevel::Off)
        }
        RelayWiringScheme::FourRelayOneProducer => {
            (production_four_relay(e1, e2, e3, e4), ConsumptionLevel::Off)
        }
        RelayWiringScheme::SingleContactFourConsumers => {
            (ProductionLevel::Off, consumption_single_contact(e1))
        }
        RelayWiringScheme::Fnn2BitOneConsumer | RelayWiringScheme::Fnn2BitTwoConsumers => {
            (ProductionLevel::Off, consumption_fnn_2bit(e1, e2))
        }
        RelayWiringScheme::Fnn2BitOneProducer | RelayWiringScheme::Fnn2BitTwoProducers => {
            (production_fnn_2bit(e1, e2), ConsumptionLevel::Off)
        }
        RelayWiringScheme::Fnn2BitOneConsumerOneProducer => {
            (production_fnn_2bit(e3, e4), consumption_fnn_2bit(e1, e2))
        }
    }
}

fn production_fnn_2bit(e1: Option<bool>, e2: Option<bool>) -> ProductionLevel {
    match (e1, e2) {
        (Some(false), Some(false)) => ProductionLevel::Full,
        (Some(false), Some(true)) => ProductionLevel::Reduced60,
        (Some(true), Some(false)) => ProductionLevel::Reduced30,
        _ => ProductionLevel::Off,
    }
}

fn production_three_relay(
    e1: Option<bool>,
    e2: Option<bool>,
    e3: Option<bool>,
) -> ProductionLevel {
    let (Some(e1), Some(e2), Some(e3)) = (e1, e2, e3) else {
        return ProductionLevel::Off;
    };

    if e1 {
        ProductionLevel::Off
    } else if e2 {
        ProductionLevel::Reduced30
    } else if e3 {
        ProductionLevel::Reduced60
    } else {
        ProductionLevel::Full
    }
}

fn production_four_relay(
    e1: Option<bool>,
    e2: Option<bool>,
    e3: Option<bool>,
    e4: Option<bool>,
) -> ProductionLevel {
    let (Some(e1), Some(e2), Some(e3), Some(e4)) = (e1, e2, e3, e4) else {
        return ProductionLevel::Off;
    };

    if e1 {
        ProductionLevel::Off
    } else if e2 {
        ProductionLevel::Reduced30
    } else if e3 {
        ProductionLevel::Reduced60
    } else if e4 {
        ProductionLevel::Full
    } else {
        // no relay closed at all: wiring fault
        ProductionLevel::Off
    }
}

fn consumption_fnn_2bit(e1: Option<bool>, e2: Option<bool>) -> ConsumptionLevel {
    match (e1, e2) {
        (Some(false), Some(false)) => ConsumptionLevel::Full,
        (Some(false), Some(true)) => ConsumptionLevel::Reduced,
        (Some(true), Some(false)) => ConsumptionLevel::Unused,
        _ => ConsumptionLevel::Off,
    }
}

// Closed contact releases consumption. This is the opposite polarity of the
// FNN 2-bit schemes, where a closed contact restricts.
fn consumption_single_contact(e1: Option<bool>) -> ConsumptionLevel {
    match e1 {
        Some(true) => ConsumptionLevel::Full,
        _ => ConsumptionLevel::Off,
    }
}
