use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::PasswordError;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Largest page `list_users` returns.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Domain service implementation for user management.
pub struct UserService<UR>
where
    UR: UserRepository + ?Sized,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository + ?Sized,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher configured with the deployment's cost
    pub fn new(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        if password.is_empty() {
            return Err(PasswordError::Empty.into());
        }

        self.password_hasher
            .hash(password)
            .map_err(|e| UserError::Password(e.into()))
    }

    async fn require_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository + ?Sized,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let mut user = User::new(command.email, self.hash_password(&command.password)?);
        user.is_active = true;
        user.is_superuser = command.is_superuser;

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            is_superuser = created_user.is_superuser,
            "User created by administrator"
        );

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.require_user(id).await
    }

    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError> {
        self.repository
            .list(offset.max(0), limit.clamp(0, MAX_PAGE_SIZE))
            .await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        self.repository
            .update_profile(id, command.first_name, command.last_name)
            .await
    }

    async fn change_password(&self, id: &UserId, password: &str) -> Result<User, UserError> {
        let password_hash = self.hash_password(password)?;

        let updated_user = self
            .repository
            .set_password_hash(id, &password_hash)
            .await?;
        tracing::info!(user_id = %updated_user.id, "Password changed");

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }

    async fn ensure_superuser(
        &self,
        email: EmailAddress,
        password: &str,
    ) -> Result<User, UserError> {
        if let Some(existing) = self.repository.find_by_email(email.as_str()).await? {
            tracing::info!(user_id = %existing.id, "Superuser already exists");
            return Ok(existing);
        }

        self.create_user(CreateUserCommand::new(email, password.to_string(), true))
            .await
    }
}
