use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::audit::{self, AuditAction};
use crate::auth::{
    claims::Role,
    dto::PublicUser,
    extractors::{require_role, AuthUser},
    repo::User,
};
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::StatusUpdateRequest;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/doctors", get(list_doctors))
        .route("/users/:id/status", patch(update_status))
}

#[instrument(skip(state, current))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    require_role(&current, Role::Admin)?;
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, _current))]
pub async fn list_doctors(
    State(state): State<AppState>,
    AuthUser(_current): AuthUser,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let doctors = User::list_active_doctors(&state.db).await?;
    Ok(Json(doctors.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, current, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(&current, Role::Admin)?;

    // Policy check, before any mutation: an admin never deactivates itself.
    if current.id == user_id && !payload.is_active {
        warn!(user_id = %user_id, "self-deactivation attempt");
        return Err(ApiError::Validation(
            "You cannot deactivate your own account".into(),
        ));
    }

    let found = User::set_active(&state.db, user_id, payload.is_active).await?;
    if !found {
        return Err(ApiError::NotFound("User"));
    }

    info!(user_id = %user_id, is_active = payload.is_active, "user status updated");
    audit::record(
        &state.db,
        current.id,
        &current.email,
        AuditAction::UpdateStatus,
        "user",
        &user_id.to_string(),
        Some(json!({ "is_active": payload.is_active })),
    )
    .await;

    Ok(Json(json!({ "message": "User status updated successfully" })))
}
