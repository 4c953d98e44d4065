use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::Role;
use chrono::Utc;

use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::SignUpCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// bcrypt work runs on the blocking thread pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - bcrypt hasher configured with the work factor
    pub fn new(repository: Arc<UR>, password_hasher: PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    async fn hash_password(&self, password: &Password) -> Result<String, UserError> {
        let hasher = self.password_hasher;
        let password = password.expose().to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn verify_password(&self, password: &Password, hash: &str) -> Result<bool, UserError> {
        let hasher = self.password_hasher;
        let password = password.expose().to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
            .map_err(UserError::from)
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn sign_up(&self, command: SignUpCommand) -> Result<User, UserError> {
        self.create_user(command.into()).await
    }

    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            return Err(UserError::EmailAlreadyInUse(command.email.to_string()));
        }

        let password_hash = self.hash_password(&command.password).await?;
        let now = Utc::now();

        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            role: command.role,
            created_on: now,
            updated_on: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            "Created user {} with role {}",
            created_user.id,
            created_user.role
        );

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::NotFoundByEmail(email.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(id).await?;

        if let Some(first_name) = command.first_name {
            user.first_name = first_name;
        }

        if let Some(last_name) = command.last_name {
            user.last_name = last_name;
        }

        user.updated_on = Utc::now();

        self.repository.update(user).await
    }

    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError> {
        let mut user = self.get_user(id).await?;

        if !self
            .verify_password(&command.old_password, &user.password_hash)
            .await?
        {
            tracing::warn!("Rejected password change for user {}", id);
            return Err(UserError::IncorrectPassword);
        }

        user.password_hash = self.hash_password(&command.new_password).await?;
        user.updated_on = Utc::now();

        self.repository.update(user).await?;
        tracing::info!("Changed password for user {}", id);

        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!("Deleted user {}", id);

        Ok(())
    }

    async fn ensure_admin(&self, command: CreateUserCommand) -> Result<User, UserError> {
        if let Some(existing) = self.repository.find_by_email(&command.email).await? {
            if existing.role != Role::Admin {
                tracing::warn!(
                    "Account {} exists without the admin role; leaving it unchanged",
                    existing.email
                );
            }
            return Ok(existing);
        }

        self.create_user(CreateUserCommand {
            role: Role::Admin,
            ..command
        })
        .await
    }
}
