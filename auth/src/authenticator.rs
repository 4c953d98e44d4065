use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenService;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::role::Role;

const DECOY_PASSWORD: &str = "decoy password for unknown accounts";

/// Authentication coordinator combining password verification and token issuance.
///
/// The one type the HTTP layer needs: it checks credentials, mints tokens
/// and verifies bearer tokens on later requests.
#[derive(Debug, Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: TokenService,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Credential verifier
    /// * `token_service` - Token issuer/verifier holding the key material
    pub fn new(password_hasher: PasswordHasher, token_service: TokenService) -> Self {
        Self {
            password_hasher,
            token_service,
        }
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Identifier to embed in the token
    /// * `role` - Role to embed in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `Password` - Stored hash is malformed
    /// * `Jwt` - Token issuance failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: &str,
        role: Role,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_service.issue(user_id, role)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Hash of a throwaway password, built once at start-up.
    ///
    /// Sign-in checks an unknown email against it so that the reply costs
    /// the same bcrypt work as a wrong password.
    pub fn decoy_hash(&self) -> Result<String, PasswordError> {
        self.password_hasher.hash(DECOY_PASSWORD)
    }

    /// Reject a sign-in for an account that does not exist.
    ///
    /// Runs one bcrypt verification against `decoy_hash` and always answers
    /// `InvalidCredentials`, whatever the outcome.
    pub fn reject_unknown_account(&self, password: &str, decoy_hash: &str) -> AuthenticationError {
        let _ = self.password_hasher.verify(password, decoy_hash);
        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    ///
    /// For flows where the caller has just been established by other
    /// means, e.g. right after sign-up.
    pub fn issue_token(&self, user_id: &str, role: Role) -> Result<String, JwtError> {
        self.token_service.issue(user_id, role)
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.token_service.verify(token)
    }

    /// Re-issue a token from a still valid one. The old token is left valid.
    pub fn refresh_token(&self, token: &str) -> Result<(String, Claims), JwtError> {
        self.token_service.refresh(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::jwt::SigningKeys;

    fn authenticator() -> Authenticator {
        let keys = SigningKeys::from_secret(b"test_secret_key_at_least_32_bytes!").unwrap();
        Authenticator::new(
            PasswordHasher::with_cost(4).unwrap(),
            TokenService::new(Arc::new(keys), Duration::seconds(600)),
        )
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate(password, &hash, "user123", Role::Member)
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        let decoded = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded.user_id, "user123");
        assert_eq!(decoded.role, Role::Member);
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator.hash_password("my_password").unwrap();

        let result = authenticator.authenticate("wrong_password", &hash, "user123", Role::Member);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_malformed_hash() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("my_password", "plaintext", "user123", Role::Member);
        assert!(matches!(
            result,
            Err(AuthenticationError::Password(PasswordError::MalformedHash(_)))
        ));
    }

    #[test]
    fn test_issue_and_refresh_token() {
        let authenticator = authenticator();

        let token = authenticator.issue_token("user123", Role::Admin).unwrap();
        let (refreshed, claims) = authenticator.refresh_token(&token).unwrap();

        assert_eq!(claims.user_id, "user123");
        assert_eq!(claims.role, Role::Admin);
        assert!(authenticator.validate_token(&refreshed).is_ok());
        assert!(authenticator.validate_token(&token).is_ok());
    }

    #[test]
    fn test_unknown_account_is_rejected_like_a_wrong_password() {
        let authenticator = authenticator();
        let decoy_hash = authenticator.decoy_hash().unwrap();

        assert!(decoy_hash.starts_with("$2b$04$"));
        assert_eq!(
            authenticator.reject_unknown_account("anything", &decoy_hash),
            AuthenticationError::InvalidCredentials
        );
        // Even the decoy password itself never signs anyone in
        assert_eq!(
            authenticator.reject_unknown_account(DECOY_PASSWORD, &decoy_hash),
            AuthenticationError::InvalidCredentials
        );
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here");
        assert_eq!(result, Err(JwtError::MalformedToken));
    }
}
