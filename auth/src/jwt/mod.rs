pub mod claims;
pub mod errors;
pub mod keys;
pub mod service;

pub use claims::Claims;
pub use errors::JwtError;
pub use keys::SigningKeys;
pub use service::TokenService;
