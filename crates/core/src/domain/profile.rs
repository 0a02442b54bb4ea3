// Profile Domain Model

use super::{EntityId, Millis};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Fixed role of a person using the system. Never changes after creation.
    pub enum Role: "role" {
        Entrepreneur => "entrepreneur",
        VenturePartner => "venture_partner",
        Mentor => "mentor",
        SuccessManager => "success_manager",
        FieldHead => "field_head",
        SelectionManager => "selection_manager",
        SelectionCommittee => "selection_committee",
        SuperAdmin => "super_admin",
    }
}

impl Role {
    /// Every role except the applicant
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Entrepreneur)
    }

    /// Roles allowed to convert a submitted application into a triage outcome
    pub fn can_triage(&self) -> bool {
        matches!(self, Role::SuccessManager | Role::SuperAdmin)
    }

    /// Roles allowed to mark an active venture completed
    pub fn can_complete_venture(&self) -> bool {
        matches!(self, Role::SuccessManager | Role::SuperAdmin)
    }
}

/// A person using the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: EntityId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub organization: Option<String>,
    pub designation: Option<String>,
    pub geography: Option<String>,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl Profile {
    /// Create a profile. The id is the auth user id it belongs to.
    pub fn new(
        id: impl Into<String>,
        now_millis: Millis,
        full_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            email: email.into(),
            phone: None,
            avatar_url: None,
            role,
            organization: None,
            designation: None,
            geography: None,
            created_at: now_millis,
            updated_at: now_millis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_wire_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), *role);
        }
        assert!(Role::from_str("janitor").is_err());
    }

    #[test]
    fn test_role_capabilities() {
        assert!(!Role::Entrepreneur.is_staff());
        assert!(Role::Mentor.is_staff());
        assert!(Role::SuccessManager.can_triage());
        assert!(Role::SuperAdmin.can_triage());
        assert!(!Role::FieldHead.can_triage());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::SelectionCommittee).unwrap();
        assert_eq!(json, "\"selection_committee\"");
    }
}
