use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::claims::Role;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller. Extraction validates the bearer token and then
/// re-fetches the live user record, so a deactivated or deleted account is
/// rejected even while its token is still unexpired. Role and email are
/// taken from the row, never from the token.
pub struct AuthUser(pub User);

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthenticated("Missing Authorization header"))?;

        let token = bearer_token(header)
            .ok_or(ApiError::Unauthenticated("Invalid Authorization header"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::Unauthenticated("Invalid or expired token")
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated("Invalid or expired token"))?;

        if !user.is_active {
            warn!(user_id = %user.id, "request from deactivated account");
            return Err(ApiError::Unauthenticated("Invalid or expired token"));
        }

        Ok(AuthUser(user))
    }
}

/// Compare the caller's current role against a route's policy.
pub fn require_role(user: &User, role: Role) -> Result<(), ApiError> {
    if user.role == role {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("{} access required", role)))
    }
}
