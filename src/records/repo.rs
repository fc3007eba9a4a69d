use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::kind::RecordKind;

/// A clinical record. The payload is an opaque JSON object owned by the
/// client; this core only knows the patient foreign key, the creator and
/// the workflow status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Record {
    pub id: Uuid,
    pub kind: RecordKind,
    pub business_id: String,
    pub patient_id: Option<Uuid>,
    pub status: Option<String>,
    pub payload: serde_json::Value,
    pub created_by: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    kind: RecordKind,
    business_id: &str,
    patient_id: Option<Uuid>,
    status: Option<&str>,
    payload: &serde_json::Value,
    created_by: Uuid,
) -> sqlx::Result<Record> {
    sqlx::query_as::<_, Record>(
        r#"
        INSERT INTO records (kind, business_id, patient_id, status, payload, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, kind, business_id, patient_id, status, payload, created_by, created_at
        "#,
    )
    .bind(kind)
    .bind(business_id)
    .bind(patient_id)
    .bind(status)
    .bind(payload)
    .bind(created_by)
    .fetch_one(db)
    .await
}

pub async fn find(db: &PgPool, kind: RecordKind, id: Uuid) -> sqlx::Result<Option<Record>> {
    sqlx::query_as::<_, Record>(
        r#"
        SELECT id, kind, business_id, patient_id, status, payload, created_by, created_at
        FROM records
        WHERE id = $1 AND kind = $2
        "#,
    )
    .bind(id)
    .bind(kind)
    .fetch_optional(db)
    .await
}

pub async fn list(
    db: &PgPool,
    kind: RecordKind,
    patient_id: Option<Uuid>,
    status: Option<&str>,
) -> sqlx::Result<Vec<Record>> {
    sqlx::query_as::<_, Record>(
        r#"
        SELECT id, kind, business_id, patient_id, status, payload, created_by, created_at
        FROM records
        WHERE kind = $1
          AND ($2::uuid IS NULL OR patient_id = $2)
          AND ($3::text IS NULL OR status = $3)
        ORDER BY created_at DESC
        LIMIT 1000
        "#,
    )
    .bind(kind)
    .bind(patient_id)
    .bind(status)
    .fetch_all(db)
    .await
}

pub async fn update_payload(
    db: &PgPool,
    kind: RecordKind,
    id: Uuid,
    payload: &serde_json::Value,
) -> sqlx::Result<Option<Record>> {
    sqlx::query_as::<_, Record>(
        r#"
        UPDATE records
        SET payload = $3
        WHERE id = $1 AND kind = $2
        RETURNING id, kind, business_id, patient_id, status, payload, created_by, created_at
        "#,
    )
    .bind(id)
    .bind(kind)
    .bind(payload)
    .fetch_optional(db)
    .await
}

/// Set the workflow status. Returns false when no such record exists.
pub async fn update_status(
    db: &PgPool,
    kind: RecordKind,
    id: Uuid,
    status: &str,
) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE records SET status = $3 WHERE id = $1 AND kind = $2")
        .bind(id)
        .bind(kind)
        .bind(status)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn patient_exists(db: &PgPool, patient_id: Uuid) -> sqlx::Result<bool> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM records WHERE id = $1 AND kind = 'patient'")
            .bind(patient_id)
            .fetch_optional(db)
            .await?;
    Ok(found.is_some())
}
