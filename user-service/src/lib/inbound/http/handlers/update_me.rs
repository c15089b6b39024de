use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserResponseData;
use crate::domain::user::models::UpdateUserCommand;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;

/// Profile fields a user may change on their own account. Role flags are
/// not accepted here.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let command = UpdateUserCommand {
        first_name: body.first_name,
        last_name: body.last_name,
    };

    state
        .user_service
        .update_user(&user.id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateMeRequest {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}
