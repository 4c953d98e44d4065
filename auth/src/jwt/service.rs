use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;
use super::keys::SigningKeys;
use crate::role::Role;

/// Issues and verifies signed identity tokens.
///
/// Stateless apart from the shared, read-only key material: a token is
/// trusted purely on its signature and expiry, and nothing is recorded
/// server side. Consequently a token stays valid until its own `exp` even
/// after it has been used to obtain a newer one.
#[derive(Debug, Clone)]
pub struct TokenService {
    keys: Arc<SigningKeys>,
    lifetime: Duration,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// * `keys` - Key material loaded at start-up
    /// * `lifetime` - Distance between `iat` and `exp` of every issued token
    pub fn new(keys: Arc<SigningKeys>, lifetime: Duration) -> Self {
        Self { keys, lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for a user, stamped with the current time.
    ///
    /// # Errors
    /// * `EncodingFailed` - Empty user id, non-positive lifetime or signing failure
    pub fn issue(&self, user_id: &str, role: Role) -> Result<String, JwtError> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a token for a user as if the current time were `now`.
    pub fn issue_at(
        &self,
        user_id: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        if user_id.is_empty() {
            return Err(JwtError::EncodingFailed("user id is empty".to_string()));
        }
        // exp must lie strictly after iat
        if self.lifetime <= Duration::zero() {
            return Err(JwtError::EncodingFailed(format!(
                "token lifetime must be positive, got {}s",
                self.lifetime.num_seconds()
            )));
        }

        let claims = Claims::new(user_id, role, now, self.lifetime);
        let header = Header::new(self.keys.algorithm());

        encode(&header, &claims, self.keys.encoding_key())
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token against the current time and return its claims.
    ///
    /// # Errors
    /// * `MalformedToken` - Not three segments, unparsable header or
    ///   payload, or a header algorithm other than the configured one
    /// * `InvalidSignature` - Signature does not match header and payload
    /// * `TokenExpired` - Current time is at or past `exp`
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let algorithm = self.keys.algorithm();

        if token.split('.').count() != 3 {
            return Err(JwtError::MalformedToken);
        }

        let header = decode_header(token).map_err(|_| JwtError::MalformedToken)?;
        if header.alg != algorithm {
            return Err(JwtError::MalformedToken);
        }

        // Payload shape is checked before the signature so that a
        // signature failure always means the signature segment itself.
        let mut inspection = Validation::new(algorithm);
        inspection.insecure_disable_signature_validation();
        inspection.validate_exp = false;
        inspection.required_spec_claims.clear();
        decode::<Claims>(token, self.keys.decoding_key(), &inspection)
            .map_err(|_| JwtError::MalformedToken)?;

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let token_data = decode::<Claims>(token, self.keys.decoding_key(), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    JwtError::MalformedToken
                }
                _ => JwtError::InvalidSignature,
            })?;

        if token_data.claims.is_expired(now.timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Re-issue a token from a still valid one.
    ///
    /// The presented token is not invalidated; both remain usable until
    /// their own expiry.
    ///
    /// # Returns
    /// The new token and its claims
    pub fn refresh(&self, token: &str) -> Result<(String, Claims), JwtError> {
        self.refresh_at(token, Utc::now())
    }

    pub fn refresh_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), JwtError> {
        let current = self.verify_at(token, now)?;
        let refreshed = self.issue_at(&current.user_id, current.role, now)?;
        let claims = Claims::new(current.user_id, current.role, now, self.lifetime);

        Ok((refreshed, claims))
    }
}
