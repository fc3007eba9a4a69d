use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::claims::Role;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by exact email match. Emails are a case-sensitive key;
    /// no normalization happens anywhere.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, role, password_hash, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, role, password_hash, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        full_name: &str,
        role: Role,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, full_name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, full_name, role, password_hash, is_active, created_at
            "#,
        )
        .bind(email)
        .bind(full_name)
        .bind(role)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn list(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, role, password_hash, is_active, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn list_active_doctors(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, role, password_hash, is_active, created_at
            FROM users
            WHERE role = 'DOCTOR' AND is_active
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await
    }

    /// Flip the active flag. Returns false when no such user exists.
    pub async fn set_active(db: &PgPool, id: Uuid, is_active: bool) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check an email/password pair against the store. Unknown email and
    /// wrong password are indistinguishable to the caller; a verified but
    /// deactivated account is reported separately.
    pub async fn verify_credentials(
        db: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let user = match Self::find_by_email(db, email).await? {
            Some(u) => u,
            None => {
                warn!(email, "login with unknown email");
                return Err(ApiError::InvalidCredentials);
            }
        };

        let ok = match verify_password(password, &user.password_hash) {
            Ok(v) => v,
            Err(e) => {
                // A row with an unparseable hash rejects like a bad password
                // rather than exposing a 500.
                error!(error = %e, user_id = %user.id, "stored password hash unreadable");
                return Err(ApiError::InvalidCredentials);
            }
        };
        if !ok {
            warn!(user_id = %user.id, "login with invalid password");
            return Err(ApiError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "login on inactive account");
            return Err(ApiError::AccountInactive);
        }

        Ok(user)
    }
}

/// Seed the first ADMIN account from `ADMIN_EMAIL`/`ADMIN_PASSWORD` when that
/// email is not taken. Registration is ADMIN-gated, so a fresh deployment
/// needs one account created out of band.
pub async fn ensure_admin(db: &PgPool) -> anyhow::Result<()> {
    let (email, password) = match (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        (Ok(e), Ok(p)) => (e, p),
        _ => return Ok(()),
    };

    if User::find_by_email(db, &email).await?.is_some() {
        return Ok(());
    }

    let full_name =
        std::env::var("ADMIN_FULL_NAME").unwrap_or_else(|_| "System Administrator".into());
    let hash = hash_password(&password)?;
    let user = User::create(db, &email, &full_name, Role::Admin, &hash).await?;
    info!(user_id = %user.id, email = %user.email, "bootstrap admin created");
    Ok(())
}
