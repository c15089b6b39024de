use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::EmailDispatchError;
use crate::domain::auth::models::EmailJob;
use crate::domain::user::models::User;

pub use auth::TokenPair;

/// Port for the credential flows: login, refresh, registration and password reset.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Exchange email and password for an access/refresh pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `InactiveUser` - Account exists but was never confirmed
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a fresh pair. The old refresh token stays valid.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token rejected
    /// * `NotFound` - Token subject no longer exists
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Create (or overwrite) an inactive account and send its confirmation email.
    ///
    /// # Errors
    /// * `EmailRegistered` - An active account already uses this email
    async fn register(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Activate the account named by a registration token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token rejected
    /// * `NotFound` - No account for the token's email
    /// * `AlreadyActive` - Account was confirmed before
    async fn confirm_registration(&self, token: &str) -> Result<User, AuthError>;

    /// Send a password-reset email.
    ///
    /// # Errors
    /// * `NotFound` - No account for this email
    /// * `InactiveUser` - Account was never confirmed
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Replace the password of the account named by a reset token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token rejected
    /// * `NotFound` - No account for the token's email
    /// * `InactiveUser` - Account was never confirmed
    async fn confirm_password_reset(&self, token: &str, new_password: &str)
        -> Result<(), AuthError>;

    /// Resolve a bearer access token to its user.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token rejected or its user is gone
    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError>;
}

/// Outbound port for handing email jobs to a delivery backend.
#[async_trait]
pub trait EmailDispatcher: Send + Sync + 'static {
    async fn send(&self, job: EmailJob) -> Result<(), EmailDispatchError>;
}
