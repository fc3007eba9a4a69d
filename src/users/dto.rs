use serde::Deserialize;

/// Request body for activating or deactivating an account.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub is_active: bool,
}
