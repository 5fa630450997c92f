//! Creator-coin holding records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badge::{Badge, BadgeTier};

/// One row of the holdings table: a user's balance of a specific writer coin.
///
/// The coin id is carried by the lookup, not the record; a batched holdings
/// query is always scoped to a single coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRecord {
    pub user_id: String,
    /// Decimal-as-string balance, exactly as stored.
    pub balance: String,
    /// Tier assigned at ingestion time; `None` when the holding was worthless.
    pub tier: Option<BadgeTier>,
    pub updated_at: DateTime<Utc>,
}

impl HoldingRecord {
    /// The badge this holding presents.
    #[must_use]
    pub fn badge(&self) -> Badge {
        Badge {
            tier: self.tier,
            balance: self.balance.clone(),
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_from_holding() {
        let holding = HoldingRecord {
            user_id: "user_1".to_string(),
            balance: "42000".to_string(),
            tier: Some(BadgeTier::Believer),
            updated_at: Utc::now(),
        };

        let badge = holding.badge();
        assert_eq!(badge.tier, Some(BadgeTier::Believer));
        assert_eq!(badge.balance, "42000");
        assert_eq!(badge.updated_at, holding.updated_at);
    }
}
