use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::audit::{self, AuditAction};
use crate::auth::{
    claims::Role,
    dto::{LoginRequest, PublicUser, RegisterRequest, TokenResponse},
    extractors::{require_role, AuthUser},
    jwt::JwtKeys,
    password::hash_password,
    repo::User,
};
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .is_some_and(|code| code == "23505")
}

#[instrument(skip(state, current, payload))]
pub async fn register(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    require_role(&current, Role::Admin)?;

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::Validation("Full name is required".into()));
    }
    let role = Role::parse(&payload.role)
        .ok_or_else(|| ApiError::Validation(format!("Unknown role: {}", payload.role)))?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Validation("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;

    let user = User::create(&state.db, &payload.email, &payload.full_name, role, &hash)
        .await
        .map_err(|e| {
            // The unique constraint closes the check-then-insert window.
            if is_unique_violation(&e) {
                ApiError::Validation("Email already registered".into())
            } else {
                ApiError::internal(e)
            }
        })?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    audit::record(
        &state.db,
        current.id,
        &current.email,
        AuditAction::Create,
        "user",
        &user.id.to_string(),
        None,
    )
    .await;

    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = User::verify_credentials(&state.db, &payload.email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id, &user.email, user.role)?;

    info!(user_id = %user.id, "user logged in");
    audit::record(
        &state.db,
        user.id,
        &user.email,
        AuditAction::Login,
        "user",
        &user.id.to_string(),
        None,
    )
    .await;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user: user.into(),
    }))
}

#[instrument(skip(user))]
pub async fn me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user.into())
}
