use bcrypt::BcryptError;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Produces and checks standard bcrypt modular-crypt strings
/// (`$2b$<cost>$<salt+digest>`), so hashes written by any other bcrypt
/// implementation verify unchanged.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Work factor used when none is configured.
    pub const DEFAULT_COST: u32 = 10;

    const MIN_COST: u32 = 4;
    const MAX_COST: u32 = 31;

    /// Create a password hasher with the default cost.
    pub fn new() -> Self {
        Self {
            cost: Self::DEFAULT_COST,
        }
    }

    /// Create a password hasher with an explicit bcrypt cost.
    ///
    /// # Errors
    /// * `InvalidCost` - Cost outside 4..=31
    pub fn with_cost(cost: u32) -> Result<Self, PasswordError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Two calls with the same input never return the same string.
    ///
    /// # Errors
    /// * `HashingFailed` - bcrypt rejected the input
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(password, self.cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`, never an error. The comparison is the
    /// constant-time one built into bcrypt.
    ///
    /// # Errors
    /// * `MalformedHash` - Stored string is not a bcrypt hash
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(password, hash).map_err(|e| match e {
            BcryptError::Io(_) | BcryptError::Rand(_) => {
                PasswordError::HashingFailed(e.to_string())
            }
            _ => PasswordError::MalformedHash(e.to_string()),
        })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(4).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$2b$04$"));

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));
        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();

        let first = hasher.hash("secret123").unwrap();
        let second = hasher.hash("secret123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret123", &first).unwrap());
        assert!(hasher.verify("secret123", &second).unwrap());
    }

    #[test]
    fn test_verify_existing_2a_hash() {
        // crypt_blowfish reference vector
        let stored = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        let hasher = PasswordHasher::new();

        assert!(hasher.verify("U*U", stored).unwrap());
        assert!(!hasher.verify("U*V", stored).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = hasher();
        let result = hasher.verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }

    #[test]
    fn test_invalid_cost() {
        assert!(matches!(
            PasswordHasher::with_cost(3),
            Err(PasswordError::InvalidCost(3))
        ));
        assert!(matches!(
            PasswordHasher::with_cost(32),
            Err(PasswordError::InvalidCost(32))
        ));
        assert_eq!(PasswordHasher::new().cost(), PasswordHasher::DEFAULT_COST);
    }
}
