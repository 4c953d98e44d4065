use std::fmt;
use std::fs;
use std::path::Path;

use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::JwtError;

/// Key material used to sign and verify tokens.
///
/// Exactly one algorithm is bound to a set of keys, so a verifier built
/// from an RSA pair can never be talked into accepting HMAC tokens or the
/// other way round. Loaded once at start-up and shared read-only.
#[derive(Clone)]
pub enum SigningKeys {
    /// RSA key pair (RS256): private key signs, public key verifies.
    Rs256 {
        encoding: EncodingKey,
        decoding: DecodingKey,
    },

    /// Shared secret (HS256).
    Hs256 {
        encoding: EncodingKey,
        decoding: DecodingKey,
    },
}

impl SigningKeys {
    /// Build RS256 keys from PEM encoded key bytes.
    ///
    /// # Arguments
    /// * `private_pem` - PKCS#1 or PKCS#8 RSA private key
    /// * `public_pem` - RSA public key
    ///
    /// # Errors
    /// * `KeyMaterial` - Either key could not be parsed
    pub fn from_rsa_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, JwtError> {
        let encoding = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| JwtError::KeyMaterial(format!("private key: {}", e)))?;
        let decoding = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| JwtError::KeyMaterial(format!("public key: {}", e)))?;

        Ok(Self::Rs256 { encoding, decoding })
    }

    /// Read and parse an RS256 key pair from disk.
    ///
    /// # Errors
    /// * `KeyMaterial` - A file is missing, unreadable or not a valid key
    pub fn from_rsa_pem_files(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> Result<Self, JwtError> {
        let private_pem = read_key_file(private_key_path.as_ref())?;
        let public_pem = read_key_file(public_key_path.as_ref())?;

        Self::from_rsa_pem(&private_pem, &public_pem)
    }

    /// Shortest accepted HS256 secret, the output size of SHA-256.
    pub const MIN_SECRET_LEN: usize = 32;

    /// Build HS256 keys from a shared secret.
    ///
    /// # Errors
    /// * `KeyMaterial` - The secret is shorter than [`Self::MIN_SECRET_LEN`] bytes
    pub fn from_secret(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(JwtError::KeyMaterial(format!(
                "shared secret must be at least {} bytes, got {}",
                Self::MIN_SECRET_LEN,
                secret.len()
            )));
        }

        Ok(Self::Hs256 {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    /// The single algorithm these keys sign and accept.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            SigningKeys::Rs256 { .. } => Algorithm::RS256,
            SigningKeys::Hs256 { .. } => Algorithm::HS256,
        }
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        match self {
            SigningKeys::Rs256 { encoding, .. } | SigningKeys::Hs256 { encoding, .. } => encoding,
        }
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        match self {
            SigningKeys::Rs256 { decoding, .. } | SigningKeys::Hs256 { decoding, .. } => decoding,
        }
    }
}

impl fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, JwtError> {
    fs::read(path).map_err(|e| JwtError::KeyMaterial(format!("{}: {}", path.display(), e)))
}
