use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::work_time::WorkTime;

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct Member {
    /// UUID of the member
    pub id: Uuid,
    /// Display name of the member
    pub name: String,
    /// Team the member belongs to
    pub team: String,
    /// Licenses and certifications
    pub qualifications: Vec<String>,
    /// Hours of the day the member can work
    pub available_hours: WorkTime,
    /// Regions the member can be sent to
    pub available_areas: Vec<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Deleted at timestamp of the member
    pub deleted_at: Option<Timestamp>,
    /// Created at timestamp of the member
    pub created_at: Timestamp,
    /// Last update timestamp of the member
    pub updated_at: Timestamp,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
