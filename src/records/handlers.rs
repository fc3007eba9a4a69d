use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::audit::{self, AuditAction};
use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{
    CreateRecordRequest, ListQuery, StatusUpdateRequest, UpdateRecordRequest, UploadReportRequest,
};
use super::ids;
use super::kind::RecordKind;
use super::repo::{self, Record};

pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/records/:kind", post(create_record).get(list_records))
        .route("/records/:kind/:id", get(get_record).put(update_record))
        .route("/records/:kind/:id/status", patch(update_record_status))
        .route("/records/report/upload", post(upload_report))
}

fn require_object(payload: &serde_json::Value) -> Result<(), ApiError> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(ApiError::Validation("payload must be a JSON object".into()))
    }
}

/// Resolve and check the patient link for a new record. Patients themselves
/// are the root of the reference graph and carry no link.
async fn resolve_patient_link(
    state: &AppState,
    kind: RecordKind,
    patient_id: Option<Uuid>,
) -> Result<Option<Uuid>, ApiError> {
    if kind == RecordKind::Patient {
        return Ok(None);
    }
    let patient_id =
        patient_id.ok_or_else(|| ApiError::Validation("patient_id is required".into()))?;
    if !repo::patient_exists(&state.db, patient_id).await? {
        warn!(%patient_id, "record references unknown patient");
        return Err(ApiError::NotFound("Patient"));
    }
    Ok(Some(patient_id))
}

#[instrument(skip(state, user, payload))]
pub async fn create_record(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(kind): Path<RecordKind>,
    Json(payload): Json<CreateRecordRequest>,
) -> Result<Json<Record>, ApiError> {
    require_object(&payload.payload)?;
    let patient_id = resolve_patient_link(&state, kind, payload.patient_id).await?;

    let business_id = ids::next_business_id(&state.db, kind).await?;
    let record = repo::insert(
        &state.db,
        kind,
        &business_id,
        patient_id,
        kind.initial_status(),
        &payload.payload,
        user.id,
    )
    .await?;

    info!(record_id = %record.id, business_id = %record.business_id, %kind, "record created");
    audit::record(
        &state.db,
        user.id,
        &user.email,
        AuditAction::Create,
        kind.as_str(),
        &record.id.to_string(),
        None,
    )
    .await;

    Ok(Json(record))
}

#[instrument(skip(state, _user))]
pub async fn list_records(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(kind): Path<RecordKind>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let records = repo::list(&state.db, kind, query.patient_id, query.status.as_deref()).await?;
    Ok(Json(records))
}

#[instrument(skip(state, user))]
pub async fn get_record(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((kind, id)): Path<(RecordKind, Uuid)>,
) -> Result<Json<Record>, ApiError> {
    let record = repo::find(&state.db, kind, id)
        .await?
        .ok_or(ApiError::NotFound(kind.display_name()))?;

    audit::record(
        &state.db,
        user.id,
        &user.email,
        AuditAction::View,
        kind.as_str(),
        &id.to_string(),
        None,
    )
    .await;

    Ok(Json(record))
}

#[instrument(skip(state, user, payload))]
pub async fn update_record(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((kind, id)): Path<(RecordKind, Uuid)>,
    Json(payload): Json<UpdateRecordRequest>,
) -> Result<Json<Record>, ApiError> {
    require_object(&payload.payload)?;

    let record = repo::update_payload(&state.db, kind, id, &payload.payload)
        .await?
        .ok_or(ApiError::NotFound(kind.display_name()))?;

    info!(record_id = %id, %kind, "record updated");
    audit::record(
        &state.db,
        user.id,
        &user.email,
        AuditAction::Update,
        kind.as_str(),
        &id.to_string(),
        None,
    )
    .await;

    Ok(Json(record))
}

#[instrument(skip(state, user, payload))]
pub async fn update_record_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((kind, id)): Path<(RecordKind, Uuid)>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if payload.status.trim().is_empty() {
        return Err(ApiError::Validation("status must not be empty".into()));
    }

    let found = repo::update_status(&state.db, kind, id, &payload.status).await?;
    if !found {
        return Err(ApiError::NotFound(kind.display_name()));
    }

    info!(record_id = %id, %kind, status = %payload.status, "record status updated");
    audit::record(
        &state.db,
        user.id,
        &user.email,
        AuditAction::UpdateStatus,
        kind.as_str(),
        &id.to_string(),
        Some(json!({ "status": payload.status })),
    )
    .await;

    Ok(Json(json!({ "message": "Status updated" })))
}

#[instrument(skip(state, user, payload))]
pub async fn upload_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UploadReportRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if payload.file_name.trim().is_empty() {
        return Err(ApiError::Validation("file_name must not be empty".into()));
    }

    let mut body = match payload.payload {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        _ => return Err(ApiError::Validation("payload must be a JSON object".into())),
    };
    body.insert("file_name".into(), json!(payload.file_name));
    body.insert("file_data".into(), json!(payload.file_data));
    if let Some(order_id) = payload.order_id {
        body.insert("order_id".into(), json!(order_id));
    }

    let patient_id =
        resolve_patient_link(&state, RecordKind::Report, Some(payload.patient_id)).await?;

    let business_id = ids::next_business_id(&state.db, RecordKind::Report).await?;
    let record = repo::insert(
        &state.db,
        RecordKind::Report,
        &business_id,
        patient_id,
        None,
        &serde_json::Value::Object(body),
        user.id,
    )
    .await?;

    info!(record_id = %record.id, business_id = %record.business_id, "report uploaded");
    audit::record(
        &state.db,
        user.id,
        &user.email,
        AuditAction::Upload,
        RecordKind::Report.as_str(),
        &record.id.to_string(),
        None,
    )
    .await;

    Ok(Json(
        json!({ "message": "Report uploaded", "report_id": record.id }),
    ))
}
