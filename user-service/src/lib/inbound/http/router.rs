use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::confirm_password_reset::confirm_password_reset;
use super::handlers::confirm_registration::confirm_registration;
use super::handlers::create_user::create_user;
use super::handlers::delete_me::delete_me;
use super::handlers::delete_user::delete_user;
use super::handlers::get_me::get_me;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::handlers::request_password_reset::request_password_reset;
use super::handlers::update_me::update_me;
use super::middleware::authenticate;
use super::middleware::require_active;
use super::middleware::require_superuser;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::ports::UserServicePort;

/// Services shared by every handler. Held as trait objects so the
/// credential store backend is chosen at start-up.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
}

pub fn create_router(
    auth_service: Arc<dyn AuthServicePort>,
    user_service: Arc<dyn UserServicePort>,
) -> Router {
    let state = AppState {
        auth_service,
        user_service,
    };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/access-token", post(login))
        .route("/api/auth/refresh-token", post(refresh_token))
        .route("/api/auth/registration", post(register))
        .route("/api/auth/registration/validation", post(confirm_registration))
        .route("/api/auth/password-reset", post(request_password_reset))
        .route(
            "/api/auth/password-reset/validation",
            post(confirm_password_reset),
        );

    // Layers run bottom-up: authenticate, then require_active, then require_superuser.
    let superuser_routes = Router::new()
        .route("/api/users", post(create_user).get(list_users))
        .route("/api/users/:user_id", get(get_user).delete(delete_user))
        .route_layer(middleware::from_fn(require_superuser));

    let active_routes = Router::new()
        .route("/api/users/me", get(get_me).put(update_me).delete(delete_me))
        .route("/api/users/me/password", post(change_password))
        .merge(superuser_routes)
        .route_layer(middleware::from_fn(require_active))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(active_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
