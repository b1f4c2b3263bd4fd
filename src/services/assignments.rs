//! Staffing operations: who works on which project, and who leads it.
//!
//! `move_member` is the terminal counterpart of dragging a member card
//! between project columns (or to/from the unassigned pool).

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    models::{member::Member, project::Project, store::Store},
    services::{LookupError, members::find_active_member, projects::find_active_project},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Member '{member}' is not assigned to project '{project}'")]
    MemberNotAssigned { member: String, project: String },

    #[error("Lead must be assigned to the project first: '{member}' is not on '{project}'")]
    LeadNotAssigned { member: String, project: String },

    #[error("Source and destination are both the unassigned pool")]
    NothingToMove,

    #[error("Source and destination are the same project")]
    SameProject,

    #[error("'{0}' cannot replace themselves")]
    SameMember(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AssignmentChange {
    pub project: Project,
    pub member: Member,
    /// False when the operation found nothing to do
    pub changed: bool,
}

fn resolve(
    store: &Store,
    project: &str,
    member: &str,
) -> Result<(Uuid, Member), AssignmentError> {
    let project_id = find_active_project(store, project)?.id;
    let member = find_active_member(store, member)?.clone();
    Ok((project_id, member))
}

/// Apply `edit` to the project and persist; returns the edited project
fn edit_project(
    store: &mut Store,
    storage: &impl Storage,
    project_id: Uuid,
    edit: impl FnOnce(&mut Project) -> bool,
) -> Result<(Project, bool), AssignmentError> {
    let Some(project) = store.get_project_mut(project_id) else {
        return Err(LookupError::NotFound {
            kind: "Project",
            query: project_id.to_string(),
        }
        .into());
    };

    let changed = edit(project);
    if changed {
        project.updated_at = jiff::Timestamp::now();
    }
    let project = project.clone();

    if changed {
        storage.save(store)?;
    }
    Ok((project, changed))
}

pub struct AssignMemberParameters {
    pub project: String,
    pub member: String,
}

/// Idempotent: assigning someone already on the project changes nothing
pub fn assign_member(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AssignMemberParameters,
) -> Result<AssignmentChange, AssignmentError> {
    let (project_id, member) = resolve(store, &parameters.project, &parameters.member)?;

    let (project, changed) = edit_project(store, storage, project_id, |p| {
        if p.has_member(member.id) {
            false
        } else {
            p.assigned_members.push(member.id);
            true
        }
    })?;

    if changed {
        info!(member = %member.name, project = %project.name, "member assigned");
    }
    Ok(AssignmentChange {
        project,
        member,
        changed,
    })
}

pub struct UnassignMemberParameters {
    pub project: String,
    pub member: String,
}

/// Also drops the lead if the member was leading the project
pub fn unassign_member(
    store: &mut Store,
    storage: &impl Storage,
    parameters: UnassignMemberParameters,
) -> Result<AssignmentChange, AssignmentError> {
    let (project_id, member) = resolve(store, &parameters.project, &parameters.member)?;

    let (project, changed) =
        edit_project(store, storage, project_id, |p| p.remove_member(member.id))?;

    if !changed {
        return Err(AssignmentError::MemberNotAssigned {
            member: member.name,
            project: project.name,
        });
    }

    info!(member = %member.name, project = %project.name, "member unassigned");
    Ok(AssignmentChange {
        project,
        member,
        changed,
    })
}

pub struct MoveMemberParameters {
    pub member: String,
    /// `None` is the unassigned pool
    pub from: Option<String>,
    /// `None` is the unassigned pool
    pub to: Option<String>,
}

pub struct MoveMemberResult {
    pub member: Member,
    pub from: Option<Project>,
    pub to: Option<Project>,
    /// False when a pool move targets a project the member is already on
    pub changed: bool,
}

pub fn move_member(
    store: &mut Store,
    storage: &impl Storage,
    parameters: MoveMemberParameters,
) -> Result<MoveMemberResult, AssignmentError> {
    if parameters.from.is_none() && parameters.to.is_none() {
        return Err(AssignmentError::NothingToMove);
    }

    let member = find_active_member(store, &parameters.member)?.clone();
    let from_id = match &parameters.from {
        Some(query) => Some(find_active_project(store, query)?.id),
        None => None,
    };
    let to_id = match &parameters.to {
        Some(query) => Some(find_active_project(store, query)?.id),
        None => None,
    };

    if from_id.is_some() && from_id == to_id {
        return Err(AssignmentError::SameProject);
    }

    if let Some(from_id) = from_id
        && let Some(source) = store.get_project(from_id)
        && !source.has_member(member.id)
    {
        return Err(AssignmentError::MemberNotAssigned {
            member: member.name,
            project: source.name.clone(),
        });
    }

    if from_id.is_none()
        && let Some(destination) = to_id.and_then(|id| store.get_project(id))
        && destination.has_member(member.id)
    {
        let to = Some(destination.clone());
        return Ok(MoveMemberResult {
            member,
            from: None,
            to,
            changed: false,
        });
    }

    let now = jiff::Timestamp::now();
    let mut from = None;
    let mut to = None;

    if let Some(source) = from_id.and_then(|id| store.get_project_mut(id)) {
        source.remove_member(member.id);
        source.updated_at = now;
        from = Some(source.clone());
    }
    if let Some(destination) = to_id.and_then(|id| store.get_project_mut(id)) {
        if !destination.has_member(member.id) {
            destination.assigned_members.push(member.id);
        }
        destination.updated_at = now;
        to = Some(destination.clone());
    }

    storage.save(store)?;

    info!(
        member = %member.name,
        from = from.as_ref().map(|p| p.name.as_str()).unwrap_or("(unassigned)"),
        to = to.as_ref().map(|p| p.name.as_str()).unwrap_or("(unassigned)"),
        "member moved"
    );
    Ok(MoveMemberResult {
        member,
        from,
        to,
        changed: true,
    })
}

pub struct ReplaceMemberParameters {
    pub project: String,
    pub member: String,
    pub replacement: String,
}

pub struct ReplaceMemberResult {
    pub project: Project,
    pub removed: Member,
    pub added: Member,
    /// The removed member was the lead, so the project has none now
    pub lead_cleared: bool,
}

/// Swap one member for another in place, keeping assignment order
pub fn replace_member(
    store: &mut Store,
    storage: &impl Storage,
    parameters: ReplaceMemberParameters,
) -> Result<ReplaceMemberResult, AssignmentError> {
    let (project_id, removed) = resolve(store, &parameters.project, &parameters.member)?;
    let added = find_active_member(store, &parameters.replacement)?.clone();
    if added.id == removed.id {
        return Err(AssignmentError::SameMember(removed.name));
    }

    let mut lead_cleared = false;
    let (project, changed) = edit_project(store, storage, project_id, |p| {
        let Some(position) = p.assigned_members.iter().position(|id| *id == removed.id) else {
            return false;
        };

        if p.has_member(added.id) {
            p.assigned_members.remove(position);
        } else {
            p.assigned_members[position] = added.id;
        }

        if p.lead_member_id == Some(removed.id) {
            p.lead_member_id = None;
            lead_cleared = true;
        }
        true
    })?;

    if !changed {
        return Err(AssignmentError::MemberNotAssigned {
            member: removed.name,
            project: project.name,
        });
    }

    info!(
        project = %project.name,
        removed = %removed.name,
        added = %added.name,
        "member replaced"
    );
    Ok(ReplaceMemberResult {
        project,
        removed,
        added,
        lead_cleared,
    })
}

pub struct SetLeadParameters {
    pub project: String,
    /// `None` clears the lead
    pub member: Option<String>,
}

pub struct SetLeadResult {
    pub project: Project,
    pub lead: Option<Member>,
}

pub fn set_lead(
    store: &mut Store,
    storage: &impl Storage,
    parameters: SetLeadParameters,
) -> Result<SetLeadResult, AssignmentError> {
    let project = find_active_project(store, &parameters.project)?;
    let project_id = project.id;

    let lead = match &parameters.member {
        Some(query) => {
            let member = find_active_member(store, query)?.clone();
            if !project.has_member(member.id) {
                return Err(AssignmentError::LeadNotAssigned {
                    member: member.name,
                    project: project.name.clone(),
                });
            }
            Some(member)
        }
        None => None,
    };

    let lead_id = lead.as_ref().map(|m| m.id);
    let (project, _) = edit_project(store, storage, project_id, |p| {
        let changed = p.lead_member_id != lead_id;
        p.lead_member_id = lead_id;
        changed
    })?;

    info!(
        project = %project.name,
        lead = lead.as_ref().map(|m| m.name.as_str()).unwrap_or("(none)"),
        "lead set"
    );
    Ok(SetLeadResult { project, lead })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::work_time::WorkTime, schedule::Schedule, storage::memory::MemoryStorage,
    };

    fn seed() -> Store {
        let mut store = Store::default();
        for name in ["Yamada Taro", "Sato Hanako", "Tanaka Jiro"] {
            store.add_member(Member {
                id: Uuid::new_v4(),
                name: String::from(name),
                ..Member::default()
            });
        }
        for (name, start, end) in [
            ("Morning Patrol", "09:00", "12:00"),
            ("Cable Repair", "11:00", "14:00"),
            ("Evening Check", "18:00", "20:00"),
        ] {
            store.add_project(Project {
                id: Uuid::new_v4(),
                name: String::from(name),
                date: "2025-06-01".parse().unwrap(),
                work_time: WorkTime::new(start, end),
                ..Project::default()
            });
        }
        store
    }

    fn assign(store: &mut Store, storage: &MemoryStorage, project: &str, member: &str) {
        assign_member(
            store,
            storage,
            AssignMemberParameters {
                project: String::from(project),
                member: String::from(member),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut store = seed();
        let storage = MemoryStorage::new();

        assign(&mut store, &storage, "Morning", "Yamada");
        let again = assign_member(
            &mut store,
            &storage,
            AssignMemberParameters {
                project: String::from("Morning"),
                member: String::from("Yamada"),
            },
        )
        .unwrap();

        assert!(!again.changed);
        assert_eq!(again.project.assigned_members.len(), 1);
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn test_assigning_overlapping_projects_raises_conflict() {
        let mut store = seed();
        let storage = MemoryStorage::new();

        assign(&mut store, &storage, "Morning", "Yamada");
        assign(&mut store, &storage, "Cable", "Yamada");

        let schedule = Schedule::from_store(&store).unwrap();
        assert_eq!(schedule.conflicts().len(), 1);
        assert_eq!(
            schedule.conflicts()[0].conflicting_projects,
            vec!["Morning Patrol", "Cable Repair"]
        );
    }

    #[test]
    fn test_unassign_clears_lead() {
        let mut store = seed();
        let storage = MemoryStorage::new();
        assign(&mut store, &storage, "Morning", "Yamada");
        set_lead(
            &mut store,
            &storage,
            SetLeadParameters {
                project: String::from("Morning"),
                member: Some(String::from("Yamada")),
            },
        )
        .unwrap();

        let change = unassign_member(
            &mut store,
            &storage,
            UnassignMemberParameters {
                project: String::from("Morning"),
                member: String::from("Yamada"),
            },
        )
        .unwrap();

        assert!(change.project.assigned_members.is_empty());
        assert_eq!(change.project.lead_member_id, None);
    }

    #[test]
    fn test_unassign_unknown_assignment_fails() {
        let mut store = seed();
        let storage = MemoryStorage::new();

        let result = unassign_member(
            &mut store,
            &storage,
            UnassignMemberParameters {
                project: String::from("Morning"),
                member: String::from("Sato"),
            },
        );

        assert!(matches!(result, Err(AssignmentError::MemberNotAssigned { .. })));
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_lead_must_be_assigned() {
        let mut store = seed();
        let storage = MemoryStorage::new();

        let result = set_lead(
            &mut store,
            &storage,
            SetLeadParameters {
                project: String::from("Morning"),
                member: Some(String::from("Sato")),
            },
        );

        assert!(matches!(result, Err(AssignmentError::LeadNotAssigned { .. })));
    }

    #[test]
    fn test_move_between_projects_resolves_conflict() {
        let mut store = seed();
        let storage = MemoryStorage::new();
        assign(&mut store, &storage, "Morning", "Yamada");
        assign(&mut store, &storage, "Cable", "Yamada");

        let result = move_member(
            &mut store,
            &storage,
            MoveMemberParameters {
                member: String::from("Yamada"),
                from: Some(String::from("Cable")),
                to: Some(String::from("Evening")),
            },
        )
        .unwrap();

        let member_id = result.member.id;
        assert!(!result.from.unwrap().has_member(member_id));
        assert!(result.to.unwrap().has_member(member_id));
        assert!(Schedule::from_store(&store).unwrap().conflicts().is_empty());
    }

    #[test]
    fn test_move_to_and_from_pool() {
        let mut store = seed();
        let storage = MemoryStorage::new();

        let placed = move_member(
            &mut store,
            &storage,
            MoveMemberParameters {
                member: String::from("Tanaka"),
                from: None,
                to: Some(String::from("Evening")),
            },
        )
        .unwrap();
        assert!(placed.from.is_none());
        assert_eq!(placed.to.unwrap().assigned_members.len(), 1);

        let pooled = move_member(
            &mut store,
            &storage,
            MoveMemberParameters {
                member: String::from("Tanaka"),
                from: Some(String::from("Evening")),
                to: None,
            },
        )
        .unwrap();
        assert!(pooled.from.unwrap().assigned_members.is_empty());
    }

    #[test]
    fn test_move_rejects_bad_requests() {
        let mut store = seed();
        let storage = MemoryStorage::new();

        let nothing = move_member(
            &mut store,
            &storage,
            MoveMemberParameters {
                member: String::from("Tanaka"),
                from: None,
                to: None,
            },
        );
        assert!(matches!(nothing, Err(AssignmentError::NothingToMove)));

        let not_there = move_member(
            &mut store,
            &storage,
            MoveMemberParameters {
                member: String::from("Tanaka"),
                from: Some(String::from("Morning")),
                to: Some(String::from("Evening")),
            },
        );
        assert!(matches!(
            not_there,
            Err(AssignmentError::MemberNotAssigned { .. })
        ));
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_replace_keeps_position_and_clears_lead() {
        let mut store = seed();
        let storage = MemoryStorage::new();
        assign(&mut store, &storage, "Morning", "Yamada");
        assign(&mut store, &storage, "Morning", "Sato");
        set_lead(
            &mut store,
            &storage,
            SetLeadParameters {
                project: String::from("Morning"),
                member: Some(String::from("Yamada")),
            },
        )
        .unwrap();

        let result = replace_member(
            &mut store,
            &storage,
            ReplaceMemberParameters {
                project: String::from("Morning"),
                member: String::from("Yamada"),
                replacement: String::from("Tanaka"),
            },
        )
        .unwrap();

        assert!(result.lead_cleared);
        assert_eq!(result.project.lead_member_id, None);
        assert_eq!(
            result.project.assigned_members,
            vec![result.added.id, store.members[1].id]
        );
    }

    #[test]
    fn test_replace_with_already_assigned_member_does_not_duplicate() {
        let mut store = seed();
        let storage = MemoryStorage::new();
        assign(&mut store, &storage, "Morning", "Yamada");
        assign(&mut store, &storage, "Morning", "Sato");

        let result = replace_member(
            &mut store,
            &storage,
            ReplaceMemberParameters {
                project: String::from("Morning"),
                member: String::from("Yamada"),
                replacement: String::from("Sato"),
            },
        )
        .unwrap();

        assert_eq!(result.project.assigned_members, vec![result.added.id]);
        assert!(!result.lead_cleared);
    }

    #[test]
    fn test_replace_with_same_member_is_rejected() {
        let mut store = seed();
        let storage = MemoryStorage::new();
        assign(&mut store, &storage, "Morning", "Yamada");
        set_lead(
            &mut store,
            &storage,
            SetLeadParameters {
                project: String::from("Morning"),
                member: Some(String::from("Yamada")),
            },
        )
        .unwrap();
        let saves = storage.save_count();

        let result = replace_member(
            &mut store,
            &storage,
            ReplaceMemberParameters {
                project: String::from("Morning"),
                member: String::from("Yamada"),
                replacement: String::from("yamada taro"),
            },
        );

        assert!(matches!(result, Err(AssignmentError::SameMember(_))));
        let project = find_active_project(&store, "Morning").unwrap();
        assert_eq!(project.assigned_members, vec![store.members[0].id]);
        assert_eq!(project.lead_member_id, Some(store.members[0].id));
        assert_eq!(storage.save_count(), saves);
    }

    #[test]
    fn test_move_from_pool_onto_current_project_is_a_no_op() {
        let mut store = seed();
        let storage = MemoryStorage::new();
        assign(&mut store, &storage, "Evening", "Tanaka");
        let before = find_active_project(&store, "Evening").unwrap().updated_at;

        let result = move_member(
            &mut store,
            &storage,
            MoveMemberParameters {
                member: String::from("Tanaka"),
                from: None,
                to: Some(String::from("Evening")),
            },
        )
        .unwrap();

        assert!(!result.changed);
        assert_eq!(result.to.unwrap().assigned_members.len(), 1);
        assert_eq!(storage.save_count(), 1);
        assert_eq!(
            find_active_project(&store, "Evening").unwrap().updated_at,
            before
        );
    }
}
