use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::Role;
use auth::SigningKeys;
use auth::TokenService;
use chrono::Duration;
use serde_json::json;
use serde_json::Value;
use user_service::domain::user::models::CreateUserCommand;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::models::Password;
use user_service::domain::user::models::PersonName;
use user_service::domain::user::ports::UserServicePort;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::InMemoryUserRepository;

pub const PRIVATE_KEY: &[u8] = include_bytes!("../../../auth/tests/fixtures/jwt_private.pem");
pub const PUBLIC_KEY: &[u8] = include_bytes!("../../../auth/tests/fixtures/jwt_public.pem");
pub const FOREIGN_PRIVATE_KEY: &[u8] =
    include_bytes!("../../../auth/tests/fixtures/foreign_private.pem");
pub const FOREIGN_PUBLIC_KEY: &[u8] =
    include_bytes!("../../../auth/tests/fixtures/foreign_public.pem");

/// Test application that spawns a real server backed by the in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub user_service: Arc<dyn UserServicePort>,
    pub authenticator: Arc<Authenticator>,
}

/// Account created through the HTTP API
pub struct TestUser {
    pub id: String,
    pub token: String,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let keys = SigningKeys::from_rsa_pem(PRIVATE_KEY, PUBLIC_KEY).expect("Invalid fixture keys");
        let password_hasher = PasswordHasher::with_cost(4).expect("Invalid bcrypt cost");
        let authenticator = Arc::new(Authenticator::new(
            password_hasher,
            TokenService::new(Arc::new(keys), Duration::seconds(600_000)),
        ));

        let user_repo = Arc::new(InMemoryUserRepository::new());
        let user_service: Arc<dyn UserServicePort> =
            Arc::new(UserService::new(user_repo, password_hasher));

        let decoy_hash = authenticator.decoy_hash().expect("Failed to hash decoy password");
        let router = create_router(
            Arc::clone(&user_service),
            Arc::clone(&authenticator),
            decoy_hash,
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            user_service,
            authenticator,
        }
    }

    /// Sign up a member and return its id and token.
    pub async fn sign_up(&self, email: &str, password: &str) -> TestUser {
        let response = self
            .post("/auth/signup")
            .json(&json!({
                "email": email,
                "password": password,
                "firstName": "Test",
                "lastName": "User"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        TestUser {
            id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
            token: body["data"]["jwt"].as_str().unwrap().to_string(),
        }
    }

    /// Create an admin directly through the service and mint a token for it.
    pub async fn admin(&self) -> TestUser {
        let admin = self
            .user_service
            .ensure_admin(CreateUserCommand {
                email: EmailAddress::new("admin@example.com".to_string()).unwrap(),
                password: Password::new("admin-password".to_string()).unwrap(),
                first_name: PersonName::new("Admin".to_string()).unwrap(),
                last_name: PersonName::new("User".to_string()).unwrap(),
                role: Role::Admin,
            })
            .await
            .expect("Failed to create admin");

        TestUser {
            id: admin.id.to_string(),
            token: self
                .authenticator
                .issue_token(&admin.id.to_string(), Role::Admin)
                .expect("Failed to issue admin token"),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }
}
