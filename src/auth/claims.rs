use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff role. Stored as the `user_role` Postgres enum; unknown values are
/// rejected when a request body is parsed, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Receptionist,
    LabTechnician,
    Accountant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Nurse => "NURSE",
            Role::Receptionist => "RECEPTIONIST",
            Role::LabTechnician => "LAB_TECHNICIAN",
            Role::Accountant => "ACCOUNTANT",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "ADMIN" => Some(Role::Admin),
            "DOCTOR" => Some(Role::Doctor),
            "NURSE" => Some(Role::Nurse),
            "RECEPTIONIST" => Some(Role::Receptionist),
            "LAB_TECHNICIAN" => Some(Role::LabTechnician),
            "ACCOUNTANT" => Some(Role::Accountant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload. Role and email are carried for convenience only; the gate
/// re-reads the live user record on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // user ID
    pub email: String,
    pub role: Role,
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
    pub iss: String,  // issuer
    pub aud: String,  // audience
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_role() {
        for name in [
            "ADMIN",
            "DOCTOR",
            "NURSE",
            "RECEPTIONIST",
            "LAB_TECHNICIAN",
            "ACCOUNTANT",
        ] {
            let role = Role::parse(name).expect("known role");
            assert_eq!(role.as_str(), name);
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(Role::parse("SURGEON").is_none());
        assert!(Role::parse("admin").is_none());
        assert!(Role::parse("").is_none());
    }

    #[test]
    fn serializes_in_wire_format() {
        let json = serde_json::to_string(&Role::LabTechnician).expect("serialize");
        assert_eq!(json, "\"LAB_TECHNICIAN\"");
        let back: Role = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Role::LabTechnician);
    }
}
