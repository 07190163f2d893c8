//! Signup and profile endpoints.

use api_types::user::{Me, SignUp, UserCreated};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
};

/// Registers a new account. This is the only route reachable without
/// credentials.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<SignUp>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let id = state
        .engine
        .create_user(&payload.username, &payload.password, payload.email.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(UserCreated { id: id.0 })))
}

pub async fn me(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Me>, ServerError> {
    let user = state
        .engine
        .user(user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("user not found".to_string()))?;

    Ok(Json(Me {
        id: user.id.0,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }))
}
