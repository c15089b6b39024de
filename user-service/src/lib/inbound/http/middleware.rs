use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::gates;
use crate::domain::user::models::User;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension carrying the user resolved from the bearer token for this request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that resolves the bearer access token and adds the user to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let user = state.auth_service.authenticate(&token).await.map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Rejects users that never confirmed their account. Runs after `authenticate`.
pub async fn require_active(req: Request, next: Next) -> Result<Response, ApiError> {
    gate(req, next, gates::require_active).await
}

/// Rejects users without the superuser flag. Runs after `require_active`.
pub async fn require_superuser(req: Request, next: Next) -> Result<Response, ApiError> {
    gate(req, next, gates::require_superuser).await
}

async fn gate(
    req: Request,
    next: Next,
    check: fn(User) -> Result<User, AuthError>,
) -> Result<Response, ApiError> {
    let CurrentUser(user) = req
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(ApiError::Unauthorized)?;

    check(user)?;

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
