use std::env;

use auth::JwtError;
use auth::SigningKeys;
use chrono::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        5
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Signing algorithm for the whole deployment. Never mixed.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum JwtAlgorithm {
    RS256,
    HS256,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub algorithm: JwtAlgorithm,
    /// PEM private key, required for RS256
    pub private_key_path: Option<String>,
    /// PEM public key, required for RS256
    pub public_key_path: Option<String>,
    /// Shared secret, required for HS256
    pub secret: Option<String>,
    #[serde(default = "JwtConfig::default_expiration_seconds")]
    pub expiration_seconds: i64,
}

impl JwtConfig {
    fn default_expiration_seconds() -> i64 {
        600_000
    }

    /// Load the key material for the configured algorithm.
    ///
    /// Called once at start-up; any failure here is fatal.
    ///
    /// # Errors
    /// * `KeyMaterial` - Path or secret missing for the algorithm, or the
    ///   key files cannot be read or parsed
    pub fn signing_keys(&self) -> Result<SigningKeys, JwtError> {
        match self.algorithm {
            JwtAlgorithm::RS256 => {
                let (Some(private_key_path), Some(public_key_path)) =
                    (&self.private_key_path, &self.public_key_path)
                else {
                    return Err(JwtError::KeyMaterial(
                        "RS256 requires jwt.private_key_path and jwt.public_key_path".to_string(),
                    ));
                };
                SigningKeys::from_rsa_pem_files(private_key_path, public_key_path)
            }
            JwtAlgorithm::HS256 => {
                let secret = self.secret.as_deref().ok_or_else(|| {
                    JwtError::KeyMaterial("HS256 requires jwt.secret".to_string())
                })?;
                SigningKeys::from_secret(secret.as_bytes())
            }
        }
    }

    /// Longest accepted token lifetime: ten years.
    pub const MAX_EXPIRATION_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

    /// Token lifetime as a duration.
    ///
    /// # Errors
    /// * `ConfigError::Message` - `expiration_seconds` is outside
    ///   `1..=MAX_EXPIRATION_SECONDS`
    pub fn lifetime(&self) -> Result<Duration, ConfigError> {
        if !(1..=Self::MAX_EXPIRATION_SECONDS).contains(&self.expiration_seconds) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_seconds must be between 1 and {}, got {}",
                Self::MAX_EXPIRATION_SECONDS,
                self.expiration_seconds
            )));
        }

        Duration::try_seconds(self.expiration_seconds).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.expiration_seconds {} is out of range",
                self.expiration_seconds
            ))
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: auth::PasswordHasher::DEFAULT_COST,
        }
    }
}

/// Admin account created at start-up when its email is unknown.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__ALGORITHM, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY_PATH: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/../auth/tests/fixtures/jwt_private.pem");
    const PUBLIC_KEY_PATH: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/../auth/tests/fixtures/jwt_public.pem");

    fn jwt_config(algorithm: JwtAlgorithm) -> JwtConfig {
        JwtConfig {
            algorithm,
            private_key_path: None,
            public_key_path: None,
            secret: None,
            expiration_seconds: 600_000,
        }
    }

    #[test]
    fn test_rs256_keys_from_files() {
        let config = JwtConfig {
            private_key_path: Some(PRIVATE_KEY_PATH.to_string()),
            public_key_path: Some(PUBLIC_KEY_PATH.to_string()),
            ..jwt_config(JwtAlgorithm::RS256)
        };

        let keys = config.signing_keys().expect("Failed to load keys");
        assert_eq!(keys.algorithm(), auth::Algorithm::RS256);
    }

    #[test]
    fn test_rs256_missing_paths() {
        let config = jwt_config(JwtAlgorithm::RS256);
        assert!(matches!(
            config.signing_keys(),
            Err(JwtError::KeyMaterial(_))
        ));
    }

    #[test]
    fn test_rs256_missing_file() {
        let config = JwtConfig {
            private_key_path: Some("missing/private.pem".to_string()),
            public_key_path: Some(PUBLIC_KEY_PATH.to_string()),
            ..jwt_config(JwtAlgorithm::RS256)
        };
        assert!(matches!(
            config.signing_keys(),
            Err(JwtError::KeyMaterial(_))
        ));
    }

    #[test]
    fn test_hs256_requires_secret() {
        let config = jwt_config(JwtAlgorithm::HS256);
        assert!(config.signing_keys().is_err());

        let config = JwtConfig {
            secret: Some("secret_key_at_least_32_bytes_long!".to_string()),
            ..jwt_config(JwtAlgorithm::HS256)
        };
        assert!(config.signing_keys().is_ok());
    }

    #[test]
    fn test_lifetime() {
        assert_eq!(
            jwt_config(JwtAlgorithm::HS256).lifetime().unwrap(),
            Duration::seconds(600_000)
        );

        let longest = JwtConfig {
            expiration_seconds: JwtConfig::MAX_EXPIRATION_SECONDS,
            ..jwt_config(JwtAlgorithm::HS256)
        };
        assert!(longest.lifetime().is_ok());
    }

    #[test]
    fn test_lifetime_out_of_range() {
        for expiration_seconds in [
            0,
            -5,
            i64::MIN,
            JwtConfig::MAX_EXPIRATION_SECONDS + 1,
            i64::MAX,
        ] {
            let config = JwtConfig {
                expiration_seconds,
                ..jwt_config(JwtAlgorithm::HS256)
            };
            assert!(matches!(config.lifetime(), Err(ConfigError::Message(_))));
        }
    }
}
