use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

// ── Identifiers ──

/// Selection id shared by definition and price records.
///
/// Stream files carry it as a JSON integer, but some exports quote it; both
/// forms normalise to the same integer so the two record kinds still join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RunnerId(pub i64);

impl fmt::Display for RunnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RunnerId {
    fn from(id: i64) -> Self {
        RunnerId(id)
    }
}

impl<'de> Deserialize<'de> for RunnerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = RunnerId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer runner id or a string holding one")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RunnerId, E> {
                Ok(RunnerId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RunnerId, E> {
                i64::try_from(v)
                    .map(RunnerId)
                    .map_err(|_| E::custom(format!("runner id {v} out of range")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RunnerId, E> {
                v.trim()
                    .parse::<i64>()
                    .map(RunnerId)
                    .map_err(|_| E::custom(format!("runner id {v:?} is not an integer")))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

// ── Input Types (one per stream line) ──

/// One parsed line of a market stream file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventRecord {
    /// Publish time, epoch milliseconds.
    pub pt: i64,
    pub mc: Vec<MarketChange>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MarketChange {
    #[serde(rename = "marketDefinition", default, skip_serializing_if = "Option::is_none")]
    pub market_definition: Option<MarketDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rc: Option<Vec<RunnerChange>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MarketDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runners: Option<Vec<RunnerDescriptor>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunnerDescriptor {
    pub id: RunnerId,
    pub name: String,
}

/// A traded-price item from an `rc` list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunnerChange {
    pub id: RunnerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltp: Option<f64>,
}

// ── Extracted Types ──

/// A price update stamped with the publish time of the record it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub id: RunnerId,
    pub ltp: Option<f64>,
    pub pt: i64,
}
