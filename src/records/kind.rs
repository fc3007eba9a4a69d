use serde::{Deserialize, Serialize};

/// Clinical record category. One closed set shared by routing (the `:kind`
/// path segment), storage (the `record_kind` Postgres enum) and business-ID
/// issuance; unknown categories die at the path boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "record_kind", rename_all = "snake_case")]
pub enum RecordKind {
    Patient,
    Appointment,
    Encounter,
    Prescription,
    Order,
    Report,
    Invoice,
}

impl RecordKind {
    /// Business-ID prefix, e.g. `PAT000042`.
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Patient => "PAT",
            RecordKind::Appointment => "APT",
            RecordKind::Encounter => "ENC",
            RecordKind::Prescription => "RX",
            RecordKind::Order => "ORD",
            RecordKind::Report => "RPT",
            RecordKind::Invoice => "INV",
        }
    }

    /// Audit-trail resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Patient => "patient",
            RecordKind::Appointment => "appointment",
            RecordKind::Encounter => "encounter",
            RecordKind::Prescription => "prescription",
            RecordKind::Order => "order",
            RecordKind::Report => "report",
            RecordKind::Invoice => "invoice",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RecordKind::Patient => "Patient",
            RecordKind::Appointment => "Appointment",
            RecordKind::Encounter => "Encounter",
            RecordKind::Prescription => "Prescription",
            RecordKind::Order => "Order",
            RecordKind::Report => "Report",
            RecordKind::Invoice => "Invoice",
        }
    }

    /// Workflow status assigned at creation, for the kinds that have one.
    pub fn initial_status(&self) -> Option<&'static str> {
        match self {
            RecordKind::Appointment => Some("scheduled"),
            RecordKind::Order => Some("pending"),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segment_parses_every_kind() {
        for (segment, kind) in [
            ("patient", RecordKind::Patient),
            ("appointment", RecordKind::Appointment),
            ("encounter", RecordKind::Encounter),
            ("prescription", RecordKind::Prescription),
            ("order", RecordKind::Order),
            ("report", RecordKind::Report),
            ("invoice", RecordKind::Invoice),
        ] {
            let parsed: RecordKind =
                serde_json::from_str(&format!("\"{segment}\"")).expect("known kind");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(serde_json::from_str::<RecordKind>("\"ward\"").is_err());
        assert!(serde_json::from_str::<RecordKind>("\"Patient\"").is_err());
    }

    #[test]
    fn prefixes_are_distinct() {
        let prefixes = [
            RecordKind::Patient,
            RecordKind::Appointment,
            RecordKind::Encounter,
            RecordKind::Prescription,
            RecordKind::Order,
            RecordKind::Report,
            RecordKind::Invoice,
        ]
        .map(|k| k.prefix());
        let unique: std::collections::HashSet<_> = prefixes.iter().collect();
        assert_eq!(unique.len(), prefixes.len());
    }

    #[test]
    fn only_workflow_kinds_start_with_a_status() {
        assert_eq!(RecordKind::Appointment.initial_status(), Some("scheduled"));
        assert_eq!(RecordKind::Order.initial_status(), Some("pending"));
        assert_eq!(RecordKind::Patient.initial_status(), None);
        assert_eq!(RecordKind::Invoice.initial_status(), None);
    }
}
