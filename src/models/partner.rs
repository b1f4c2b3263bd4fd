use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An outside contractor that can staff projects
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct ExternalPartner {
    pub id: Uuid,
    pub name: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ExternalPartner {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Headcount a partner sends to one project
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PartnerAssignment {
    pub partner_id: Uuid,
    pub member_count: u32,
    pub representative_name: String,
}
