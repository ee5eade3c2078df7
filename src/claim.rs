//! SKU claim entries.
//!
//! `watch:sku:{sku}` holds `{claimed_at_millis}@{owner_id}`. The timestamp
//! tells a claim whose write is still in flight apart from one left behind
//! by a write that never finished its cleanup.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Claims younger than this are never taken over.
pub const DEFAULT_CLAIM_GRACE: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkuClaim {
    pub owner: String,
    pub claimed_at: DateTime<Utc>,
}

impl SkuClaim {
    pub fn new(owner: impl Into<String>, claimed_at: DateTime<Utc>) -> Self {
        SkuClaim {
            owner: owner.into(),
            claimed_at,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        format!("{}@{}", self.claimed_at.timestamp_millis(), self.owner).into_bytes()
    }

    /// `None` for bytes that are not a claim. Owner ids may contain `@`.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(bytes).ok()?;
        let (millis, owner) = text.split_once('@')?;
        if owner.is_empty() {
            return None;
        }
        let claimed_at = DateTime::from_timestamp_millis(millis.parse().ok()?)?;
        Some(SkuClaim::new(owner, claimed_at))
    }

    /// Whether the claim is at least `grace` old at `now`. A claim stamped
    /// in the future never is.
    pub fn is_settled(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        (now - self.claimed_at)
            .to_std()
            .map(|age| age >= grace)
            .unwrap_or(false)
    }
}
