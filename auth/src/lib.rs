//! Authentication utilities library
//!
//! Provides the authentication core shared by the account service:
//! - Password hashing (bcrypt)
//! - Signed token issuance and validation (RS256 or HS256, one per deployment)
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(4).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{Role, SigningKeys, TokenService};
//!
//! let keys = SigningKeys::from_secret(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let tokens = TokenService::new(Arc::new(keys), chrono::Duration::seconds(600));
//! let token = tokens.issue("user123", Role::Member).unwrap();
//! let claims = tokens.verify(&token).unwrap();
//! assert_eq!(claims.role, Role::Member);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use std::sync::Arc;
//!
//! use auth::{Authenticator, PasswordHasher, Role, SigningKeys, TokenService};
//!
//! let keys = SigningKeys::from_secret(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let auth = Authenticator::new(
//!     PasswordHasher::with_cost(4).unwrap(),
//!     TokenService::new(Arc::new(keys), chrono::Duration::seconds(600)),
//! );
//!
//! // Sign up: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Sign in: verify and issue token
//! let result = auth.authenticate("password123", &hash, "user123", Role::Member).unwrap();
//!
//! // Later requests: validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.user_id, "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod role;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jsonwebtoken::Algorithm;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::SigningKeys;
pub use jwt::TokenService;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use role::Role;
pub use role::UnknownRole;
