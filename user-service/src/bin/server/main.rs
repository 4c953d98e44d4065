use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::AdminConfig;
use user_service::config::Config;
use user_service::domain::user::models::CreateUserCommand;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::models::Password;
use user_service::domain::user::models::PersonName;
use user_service::domain::user::ports::UserServicePort;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::InMemoryUserRepository;
use user_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_algorithm = ?config.jwt.algorithm,
        jwt_expiration_seconds = config.jwt.expiration_seconds,
        bcrypt_cost = config.password.bcrypt_cost,
        "Configuration loaded"
    );

    // Key material is read exactly once; a missing key aborts start-up
    let signing_keys = Arc::new(config.jwt.signing_keys()?);
    tracing::info!(algorithm = ?signing_keys.algorithm(), "Signing keys loaded");

    let password_hasher = PasswordHasher::with_cost(config.password.bcrypt_cost)?;
    let token_service = TokenService::new(signing_keys, config.jwt.lifetime()?);
    let authenticator = Arc::new(Authenticator::new(password_hasher, token_service));

    let decoy_hash = {
        let authenticator = Arc::clone(&authenticator);
        tokio::task::spawn_blocking(move || authenticator.decoy_hash()).await??
    };

    let user_service: Arc<dyn UserServicePort> = match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
            Arc::new(UserService::new(user_repository, password_hasher))
        }
        None => {
            tracing::warn!("No database configured, accounts are kept in memory only");
            let user_repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserService::new(user_repository, password_hasher))
        }
    };

    if let Some(admin) = &config.admin {
        let admin_user = user_service.ensure_admin(admin_command(admin)?).await?;
        tracing::info!(user_id = %admin_user.id, email = %admin_user.email, "Admin account ready");
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator, decoy_hash);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

fn admin_command(admin: &AdminConfig) -> Result<CreateUserCommand, anyhow::Error> {
    Ok(CreateUserCommand {
        email: EmailAddress::new(admin.email.clone())?,
        password: Password::new(admin.password.clone())?,
        first_name: PersonName::new(admin.first_name.clone())?,
        last_name: PersonName::new(admin.last_name.clone())?,
        role: auth::Role::Admin,
    })
}
