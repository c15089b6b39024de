use thiserror::Error;

use crate::user::errors::PasswordError;
use crate::user::errors::UserError;

/// Failures surfaced by the authentication flows and request gates.
///
/// `InvalidCredentials` and `Unauthenticated` deliberately carry no detail so
/// callers cannot tell a wrong password from an unknown account or a bad token.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Inactive user")]
    InactiveUser,

    #[error("User already active")]
    AlreadyActive,

    #[error("Email already registered")]
    EmailRegistered,

    #[error("User not found")]
    NotFound,

    #[error("Not enough privileges")]
    Forbidden,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AuthError::NotFound,
            UserError::EmailAlreadyExists(_) => AuthError::EmailRegistered,
            UserError::AlreadyActive(_) => AuthError::AlreadyActive,
            UserError::InvalidEmail(e) => AuthError::InvalidEmail(e.to_string()),
            UserError::Password(PasswordError::Empty) => {
                AuthError::InvalidPassword(PasswordError::Empty.to_string())
            }
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<auth::AuthenticationError> for AuthError {
    fn from(err: auth::AuthenticationError) -> Self {
        match err {
            auth::AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
            auth::AuthenticationError::JwtError(e) => AuthError::Internal(e.to_string()),
        }
    }
}

impl From<auth::JwtError> for AuthError {
    fn from(err: auth::JwtError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Error for handing an email job to the delivery backend
#[derive(Debug, Clone, Error)]
pub enum EmailDispatchError {
    #[error("Failed to serialize email job: {0}")]
    SerializationFailed(String),

    #[error("Failed to dispatch email job: {0}")]
    DeliveryFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::errors::EmailError;

    #[test]
    fn test_unique_violation_maps_to_email_registered() {
        let err: AuthError = UserError::EmailAlreadyExists("a@x.com".to_string()).into();
        assert!(matches!(err, AuthError::EmailRegistered));
    }

    #[test]
    fn test_lost_activation_race_maps_to_already_active() {
        let err: AuthError = UserError::AlreadyActive("a@x.com".to_string()).into();
        assert!(matches!(err, AuthError::AlreadyActive));
    }

    #[test]
    fn test_store_failures_are_internal() {
        let err: AuthError = UserError::DatabaseError("connection reset".to_string()).into();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn test_validation_errors_keep_their_kind() {
        let err: AuthError = UserError::InvalidEmail(EmailError::InvalidFormat("x".into())).into();
        assert!(matches!(err, AuthError::InvalidEmail(_)));

        let err: AuthError = UserError::Password(PasswordError::Empty).into();
        assert!(matches!(err, AuthError::InvalidPassword(_)));
    }
}
