//! Role checks applied after a request has been authenticated.
//!
//! Each gate takes the user resolved by the previous step and hands it back
//! on success, so they chain with `and_then`.

use crate::domain::auth::errors::AuthError;
use crate::domain::user::models::User;

pub fn require_active(user: User) -> Result<User, AuthError> {
    if !user.is_active {
        return Err(AuthError::InactiveUser);
    }
    Ok(user)
}

pub fn require_superuser(user: User) -> Result<User, AuthError> {
    if !user.is_superuser {
        return Err(AuthError::Forbidden);
    }
    Ok(user)
}
