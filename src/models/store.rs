use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{member::Member, partner::ExternalPartner, project::Project};

/// Current schema version
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone)]
pub struct Store {
    pub version: u32,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub partners: Vec<ExternalPartner>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            members: vec![],
            projects: vec![],
            partners: vec![],
        }
    }
}

impl Store {
    pub fn add_member(&mut self, member: Member) {
        self.members.push(member);
    }

    pub fn get_member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn get_member_mut(&mut self, id: Uuid) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    pub fn get_active_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_active())
    }

    pub fn get_deleted_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.is_active())
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn get_project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn get_project_mut(&mut self, id: Uuid) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    pub fn get_active_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.is_active())
    }

    pub fn get_deleted_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| !p.is_active())
    }

    /// Active projects that have this member assigned
    pub fn get_projects_for_member(&self, member_id: Uuid) -> impl Iterator<Item = &Project> {
        self.get_active_projects()
            .filter(move |p| p.has_member(member_id))
    }

    pub fn add_partner(&mut self, partner: ExternalPartner) {
        self.partners.push(partner);
    }

    pub fn get_partner(&self, id: Uuid) -> Option<&ExternalPartner> {
        self.partners.iter().find(|p| p.id == id)
    }

    pub fn get_partner_mut(&mut self, id: Uuid) -> Option<&mut ExternalPartner> {
        self.partners.iter_mut().find(|p| p.id == id)
    }

    pub fn get_active_partners(&self) -> impl Iterator<Item = &ExternalPartner> {
        self.partners.iter().filter(|p| p.is_active())
    }

    pub fn get_deleted_partners(&self) -> impl Iterator<Item = &ExternalPartner> {
        self.partners.iter().filter(|p| !p.is_active())
    }
}
