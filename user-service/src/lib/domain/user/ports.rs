use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user management operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Create an active account on behalf of an administrator.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Password` - Password empty or hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Page through users ordered by creation time.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError>;

    /// Update profile fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Replace the password of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Password` - Password empty or hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn change_password(&self, id: &UserId, password: &str) -> Result<User, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;

    /// Create the bootstrap superuser unless the email is already taken.
    ///
    /// # Returns
    /// The existing or newly created user
    async fn ensure_superuser(
        &self,
        email: EmailAddress,
        password: &str,
    ) -> Result<User, UserError>;
}

/// Credential store gateway.
///
/// Every write must respect the unique email constraint atomically.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by exact email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve a page of users, oldest first.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError>;

    /// Set only the provided profile fields, leaving the rest of the row untouched.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(
        &self,
        id: &UserId,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<User, UserError>;

    /// Replace the password digest.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_password_hash(&self, id: &UserId, password_hash: &str)
        -> Result<User, UserError>;

    /// Replace the digest of a user that has not confirmed registration yet.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `AlreadyActive` - User was activated in the meantime
    /// * `DatabaseError` - Database operation failed
    async fn replace_pending_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<User, UserError>;

    /// Flip `is_active` from false to true. Only one caller can win.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `AlreadyActive` - User is already active
    /// * `DatabaseError` - Database operation failed
    async fn activate(&self, id: &UserId) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}
