use serde::Deserialize;
use uuid::Uuid;

/// Request body for creating a record. `patient_id` is required for every
/// kind except `patient` itself; the payload is stored as-is.
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub patient_id: Option<Uuid>,
    pub payload: serde_json::Value,
}

/// Request body for replacing a record's payload.
#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub payload: serde_json::Value,
}

/// Request body for a workflow-status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// List filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub patient_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Request body for attaching a report file. The content is an opaque
/// base64 string stored inside the payload; this core never decodes it.
#[derive(Debug, Deserialize)]
pub struct UploadReportRequest {
    pub patient_id: Uuid,
    pub order_id: Option<Uuid>,
    pub file_name: String,
    pub file_data: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}
