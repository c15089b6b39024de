use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::TokenPair;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<TokensResponseData>, ApiError> {
    state
        .auth_service
        .login(&body.email, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|tokens| ApiSuccess::new(StatusCode::CREATED, tokens.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokensResponseData {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokensResponseData {
    fn from(tokens: TokenPair) -> Self {
        Self {
            token_type: "Bearer".to_string(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}
