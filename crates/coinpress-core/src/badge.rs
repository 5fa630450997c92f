//! Supporter badges and their tiers.
//!
//! A badge is a snapshot of a user's standing as a holder of a writer's
//! creator coin. Tiers are assigned at data-ingestion time from the USD value
//! of the holding and stored alongside the balance; nothing at read time
//! recomputes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum USD holding value for the patron tier.
pub const PATRON_MIN_USD: f64 = 50.0;

/// Minimum USD holding value for the believer tier.
pub const BELIEVER_MIN_USD: f64 = 10.0;

/// Supporter tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    /// Holds any nonzero value of the coin.
    Supporter,
    /// Holding worth at least `BELIEVER_MIN_USD`.
    Believer,
    /// Holding worth at least `PATRON_MIN_USD`.
    Patron,
}

impl BadgeTier {
    /// Classifies a holding by its USD value.
    ///
    /// Returns `None` for zero or negative values: such holders get no tier,
    /// though their holding row may still exist.
    #[must_use]
    pub fn from_usd_value(value_usd: f64) -> Option<Self> {
        if value_usd >= PATRON_MIN_USD {
            Some(Self::Patron)
        } else if value_usd >= BELIEVER_MIN_USD {
            Some(Self::Believer)
        } else if value_usd > 0.0 {
            Some(Self::Supporter)
        } else {
            None
        }
    }

    /// The lowercase wire name of the tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supporter => "supporter",
            Self::Believer => "believer",
            Self::Patron => "patron",
        }
    }
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown tier name.
#[derive(Debug, thiserror::Error)]
#[error("unknown badge tier: {0}")]
pub struct ParseTierError(String);

impl FromStr for BadgeTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supporter" => Ok(Self::Supporter),
            "believer" => Ok(Self::Believer),
            "patron" => Ok(Self::Patron),
            other => Err(ParseTierError(other.to_string())),
        }
    }
}

/// A resolved supporter badge.
///
/// `balance` is a decimal-as-string straight from the holdings table; it is
/// never parsed into a float anywhere in the pipeline. `tier` is `None` for
/// holders whose balance was worth nothing at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub tier: Option<BadgeTier>,
    pub balance: String,
    pub updated_at: DateTime<Utc>,
}
