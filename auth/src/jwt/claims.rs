use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::role::Role;

/// Identity claim embedded in every token.
///
/// Timestamps are seconds since the Unix epoch. `exp` is always `iat`
/// plus the issuing service's configured lifetime, capped at `i64::MAX`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Opaque user identifier
    #[serde(rename = "userId")]
    pub user_id: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a user issued at `issued_at`, valid for `lifetime`.
    pub fn new(
        user_id: impl ToString,
        role: Role,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let iat = issued_at.timestamp();

        Self {
            user_id: user_id.to_string(),
            role,
            iat,
            exp: iat.saturating_add(lifetime.num_seconds()),
        }
    }

    /// Check if the claims are expired at `current_timestamp`.
    ///
    /// The expiry instant itself already counts as expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
