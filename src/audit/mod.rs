use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

/// Action verbs recorded in the trail. Stored as text so the log stays
/// readable straight out of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    View,
    Update,
    UpdateStatus,
    Upload,
    Login,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::View => "VIEW",
            AuditAction::Update => "UPDATE",
            AuditAction::UpdateStatus => "UPDATE_STATUS",
            AuditAction::Upload => "UPLOAD",
            AuditAction::Login => "LOGIN",
        }
    }
}

/// Append one entry to the audit trail. Best-effort relative to the primary
/// operation: a failed write is reported through the error log and nothing
/// else. It never aborts the request, and entries are never rolled back.
pub async fn record(
    db: &PgPool,
    actor_id: Uuid,
    actor_email: &str,
    action: AuditAction,
    resource_type: &str,
    resource_id: &str,
    details: Option<serde_json::Value>,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_logs (actor_id, actor_email, action, resource_type, resource_id, details)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(actor_id)
    .bind(actor_email)
    .bind(action.as_str())
    .bind(resource_type)
    .bind(resource_id)
    .bind(details)
    .execute(db)
    .await;

    if let Err(e) = result {
        error!(
            error = %e,
            action = action.as_str(),
            resource_type,
            resource_id,
            "audit append failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_verbs_match_the_trail_format() {
        assert_eq!(AuditAction::Create.as_str(), "CREATE");
        assert_eq!(AuditAction::View.as_str(), "VIEW");
        assert_eq!(AuditAction::Update.as_str(), "UPDATE");
        assert_eq!(AuditAction::UpdateStatus.as_str(), "UPDATE_STATUS");
        assert_eq!(AuditAction::Upload.as_str(), "UPLOAD");
        assert_eq!(AuditAction::Login.as_str(), "LOGIN");
    }
}
