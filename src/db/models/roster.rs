//! People and groupings: technicians, contractors and the groups that order them
//! on the grid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Subject;

/// An internal technician.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ContractorCategory {
    Contractor,
    Subcontractor,
}

impl ContractorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractorCategory::Contractor => "contractor",
            ContractorCategory::Subcontractor => "subcontractor",
        }
    }
}

impl Default for ContractorCategory {
    fn default() -> Self {
        ContractorCategory::Contractor
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: ContractorCategory,
    pub notes: Option<String>,
    pub is_active: bool,
}

/// Input for creating (no `id`) or updating a contractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorDraft {
    pub id: Option<String>,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: ContractorCategory,
    pub notes: Option<String>,
}

/// What removing a contractor actually did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ContractorRemoval {
    Deleted,
    /// Still referenced by entries or memberships, so only marked inactive.
    Deactivated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub id: String,
    pub group_id: String,
    pub subject: Subject,
    pub role_label: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianGroup {
    pub id: String,
    pub name: String,
    pub sort_order: i64,
    pub members: Vec<GroupMember>,
}

impl TechnicianGroup {
    pub fn has_member(&self, subject: &Subject) -> bool {
        self.members.iter().any(|member| &member.subject == subject)
    }
}

/// Input for the add-member dialog. Both selections start empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub group_id: Option<String>,
    pub subject: Option<Subject>,
    pub role_label: Option<String>,
}
