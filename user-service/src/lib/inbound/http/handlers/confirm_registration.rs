use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::router::AppState;

pub async fn confirm_registration(
    State(state): State<AppState>,
    Json(body): Json<TokenRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .auth_service
        .confirm_registration(&body.token)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Account activated")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenRequest {
    token: String,
}
