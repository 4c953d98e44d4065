use std::sync::Arc;

use auth::JwtError;
use auth::PasswordHasher;
use auth::Role;
use auth::SigningKeys;
use auth::TokenService;
use chrono::Duration;
use chrono::Utc;
use proptest::prelude::*;

const PRIVATE_PEM: &[u8] = include_bytes!("fixtures/jwt_private.pem");
const PUBLIC_PEM: &[u8] = include_bytes!("fixtures/jwt_public.pem");
const FOREIGN_PRIVATE_PEM: &[u8] = include_bytes!("fixtures/foreign_private.pem");
const FOREIGN_PUBLIC_PEM: &[u8] = include_bytes!("fixtures/foreign_public.pem");

const LIFETIME_SECONDS: i64 = 600_000;

const BASE64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn token_service(private_pem: &[u8], public_pem: &[u8]) -> TokenService {
    let keys = SigningKeys::from_rsa_pem(private_pem, public_pem).expect("Failed to load keys");
    TokenService::new(Arc::new(keys), Duration::seconds(LIFETIME_SECONDS))
}

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Member), Just(Role::Admin)]
}

fn user_id() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9-]{1,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn verify_accepts_every_issued_token(user_id in user_id(), role in role()) {
        let service = token_service(PRIVATE_PEM, PUBLIC_PEM);

        let token = service.issue(&user_id, role).unwrap();
        let claims = service.verify(&token).unwrap();

        prop_assert_eq!(claims.user_id, user_id);
        prop_assert_eq!(claims.role, role);
        prop_assert_eq!(claims.exp - claims.iat, LIFETIME_SECONDS);
    }

    #[test]
    fn any_signature_mutation_is_rejected(
        user_id in user_id(),
        role in role(),
        position in any::<prop::sample::Index>(),
        replacement in any::<prop::sample::Index>(),
    ) {
        let service = token_service(PRIVATE_PEM, PUBLIC_PEM);
        let token = service.issue(&user_id, role).unwrap();

        let signature_start = token.rfind('.').unwrap() + 1;
        let index = signature_start + position.index(token.len() - signature_start);
        let mut bytes = token.into_bytes();

        let mut substitute = BASE64URL[replacement.index(BASE64URL.len())];
        if substitute == bytes[index] {
            substitute = if substitute == b'A' { b'B' } else { b'A' };
        }
        bytes[index] = substitute;
        let mutated = String::from_utf8(bytes).unwrap();

        prop_assert_eq!(service.verify(&mutated), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn tokens_past_their_lifetime_are_rejected(
        user_id in user_id(),
        role in role(),
        overdue in 0i64..1_000_000,
    ) {
        let service = token_service(PRIVATE_PEM, PUBLIC_PEM);
        let issued_at = Utc::now() - Duration::seconds(LIFETIME_SECONDS + overdue);

        let token = service.issue_at(&user_id, role, issued_at).unwrap();

        prop_assert_eq!(service.verify(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn tokens_from_other_keys_never_verify(user_id in user_id(), role in role()) {
        let service = token_service(PRIVATE_PEM, PUBLIC_PEM);
        let foreign = token_service(FOREIGN_PRIVATE_PEM, FOREIGN_PUBLIC_PEM);
        let hmac = TokenService::new(
            Arc::new(SigningKeys::from_secret(PUBLIC_PEM).unwrap()),
            Duration::seconds(LIFETIME_SECONDS),
        );

        let foreign_token = foreign.issue(&user_id, role).unwrap();
        let hmac_token = hmac.issue(&user_id, role).unwrap();

        prop_assert_eq!(service.verify(&foreign_token), Err(JwtError::InvalidSignature));
        prop_assert_eq!(service.verify(&hmac_token), Err(JwtError::MalformedToken));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn hashing_is_salted_but_verifiable(password in "[ -~]{1,64}") {
        let hasher = PasswordHasher::with_cost(4).unwrap();

        let first = hasher.hash(&password).unwrap();
        let second = hasher.hash(&password).unwrap();

        prop_assert_ne!(&first, &second);
        prop_assert!(hasher.verify(&password, &first).unwrap());
        prop_assert!(hasher.verify(&password, &second).unwrap());
    }

    #[test]
    fn different_passwords_never_verify(password in "[ -~]{1,64}", other in "[ -~]{1,64}") {
        prop_assume!(password != other);
        let hasher = PasswordHasher::with_cost(4).unwrap();

        let hash = hasher.hash(&other).unwrap();

        prop_assert!(!hasher.verify(&password, &hash).unwrap());
    }
}
