use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{partner::PartnerAssignment, work_time::WorkTime};

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct Project {
    /// UUID of the project
    pub id: Uuid,
    /// Name of the project
    pub name: String,
    /// Slug of the project
    pub slug: String,
    /// Day the work takes place
    pub date: Date,
    /// Work-time window on that day
    pub work_time: WorkTime,
    /// Site of the work
    pub location: String,
    /// Description of the work to be done
    pub work_content: String,
    /// Headcount the project needs
    pub required_members: u32,
    /// Notes of the project
    pub notes: Option<String>,
    /// Members staffed on the project, in assignment order
    pub assigned_members: Vec<Uuid>,
    /// Member responsible for the project, always one of `assigned_members`
    pub lead_member_id: Option<Uuid>,
    /// Outside contractors staffed on the project
    pub external_partners: Vec<PartnerAssignment>,
    /// Deleted at timestamp of the project
    pub deleted_at: Option<Timestamp>,
    /// Created at timestamp of the project
    pub created_at: Timestamp,
    /// Last update timestamp of the project
    pub updated_at: Timestamp,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn has_member(&self, member_id: Uuid) -> bool {
        self.assigned_members.contains(&member_id)
    }

    /// Total headcount including partner staff
    pub fn staffed_count(&self) -> u32 {
        let partner_staff: u32 = self.external_partners.iter().map(|p| p.member_count).sum();
        self.assigned_members.len() as u32 + partner_staff
    }

    /// Removes a member and drops the lead reference if it pointed at them.
    /// Returns whether the member was assigned.
    pub fn remove_member(&mut self, member_id: Uuid) -> bool {
        let before = self.assigned_members.len();
        self.assigned_members.retain(|id| *id != member_id);
        if self.lead_member_id == Some(member_id) {
            self.lead_member_id = None;
        }
        self.assigned_members.len() != before
    }
}
