//! Derived view over a store snapshot.
//!
//! Everything shown on the board or dashboard is read from a `Schedule`, so
//! soft-deleted members and projects are filtered out in one place and the
//! conflict list is always recomputed from the same snapshot.

use jiff::civil::Date;
use uuid::Uuid;

use crate::{
    conflicts::{ConflictAlert, ConflictError, detect_conflicts},
    models::{member::Member, project::Project, store::Store},
};

pub struct Schedule {
    projects: Vec<Project>,
    members: Vec<Member>,
    conflicts: Vec<ConflictAlert>,
}

impl Schedule {
    pub fn from_store(store: &Store) -> Result<Self, ConflictError> {
        let projects: Vec<Project> = store.get_active_projects().cloned().collect();
        let members: Vec<Member> = store.get_active_members().cloned().collect();
        let conflicts = detect_conflicts(&projects, &members)?;

        Ok(Self {
            projects,
            members,
            conflicts,
        })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn conflicts(&self) -> &[ConflictAlert] {
        &self.conflicts
    }

    pub fn conflicts_on(&self, date: Date) -> impl Iterator<Item = &ConflictAlert> {
        self.conflicts.iter().filter(move |c| c.date == date)
    }

    /// Conflicts are keyed by project name, so same-named projects share the flag
    pub fn project_has_conflict(&self, project: &Project) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.date == project.date && c.involves_project(&project.name))
    }

    pub fn member_has_conflict(&self, member_id: Uuid) -> bool {
        self.conflicts.iter().any(|c| c.member_id == member_id)
    }

    pub fn member_has_conflict_on(&self, member_id: Uuid, date: Date) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.member_id == member_id && c.date == date)
    }

    /// Active projects on a day, earliest start first
    pub fn projects_on(&self, date: Date) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.projects.iter().filter(|p| p.date == date).collect();
        projects.sort_by(|a, b| a.work_time.start.cmp(&b.work_time.start));
        projects
    }

    pub fn get_member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Resolve assigned ids to active members, dropping stale references
    pub fn assigned_members<'a>(&'a self, project: &'a Project) -> impl Iterator<Item = &'a Member> {
        project
            .assigned_members
            .iter()
            .filter_map(|id| self.get_member(*id))
    }

    /// Active members with no project on `date` whose name contains `search`
    pub fn unassigned_members_on(&self, date: Date, search: Option<&str>) -> Vec<&Member> {
        let needle = search.map(str::to_lowercase).unwrap_or_default();
        let busy: Vec<Uuid> = self
            .projects
            .iter()
            .filter(|p| p.date == date)
            .flat_map(|p| p.assigned_members.iter().copied())
            .collect();

        self.members
            .iter()
            .filter(|m| !busy.contains(&m.id))
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .collect()
    }
}
