use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    models::{
        member::Member,
        store::Store,
        work_time::{WorkTime, WorkTimeError},
    },
    services::{LookupError, find_by_name, merge_notes},
    storage::{Storage, StorageError},
};

const DEFAULT_AVAILABLE_START: &str = "08:00";
const DEFAULT_AVAILABLE_END: &str = "18:00";

/// Resolve an active member by (partial) name
pub fn find_active_member<'a>(store: &'a Store, query: &str) -> Result<&'a Member, LookupError> {
    find_by_name(store.get_active_members(), query, "Member", |m| m.name.as_str())
}

fn missing(query: &str) -> LookupError {
    LookupError::NotFound {
        kind: "Member",
        query: query.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum CreateMemberError {
    #[error("Member name cannot be empty")]
    EmptyName,

    #[error("Member with name '{0}' already exists")]
    MemberAlreadyExists(String),

    #[error("Invalid available hours: {0}")]
    InvalidAvailableHours(#[from] WorkTimeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreateMemberParameters {
    pub name: String,
    pub team: String,
    pub qualifications: Vec<String>,
    pub available_start: Option<String>,
    pub available_end: Option<String>,
    pub available_areas: Vec<String>,
    pub notes: Option<String>,
}

pub fn create_member(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreateMemberParameters,
) -> Result<Member, CreateMemberError> {
    let name = parameters.name.trim().to_string();
    if name.is_empty() {
        return Err(CreateMemberError::EmptyName);
    }

    if store
        .get_active_members()
        .any(|m| m.name.to_lowercase() == name.to_lowercase())
    {
        return Err(CreateMemberError::MemberAlreadyExists(name));
    }

    let available_hours = WorkTime::new(
        parameters
            .available_start
            .unwrap_or_else(|| DEFAULT_AVAILABLE_START.to_string()),
        parameters
            .available_end
            .unwrap_or_else(|| DEFAULT_AVAILABLE_END.to_string()),
    );
    available_hours.window()?;

    let now = jiff::Timestamp::now();
    let member = Member {
        id: Uuid::new_v4(),
        name,
        team: parameters.team,
        qualifications: parameters.qualifications,
        available_hours,
        available_areas: parameters.available_areas,
        notes: merge_notes(parameters.notes, None),
        deleted_at: None,
        created_at: now,
        updated_at: now,
    };

    store.add_member(member.clone());
    storage.save(store)?;

    info!(member = %member.name, id = %member.id, "member created");
    Ok(member)
}

#[derive(Debug, Error)]
pub enum UpdateMemberError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Member name cannot be empty")]
    EmptyName,

    #[error("Member with name '{0}' already exists")]
    MemberAlreadyExists(String),

    #[error("Invalid available hours: {0}")]
    InvalidAvailableHours(#[from] WorkTimeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// `None` fields are left untouched
#[derive(Default)]
pub struct UpdateMemberParameters {
    pub member: String,
    pub name: Option<String>,
    pub team: Option<String>,
    pub qualifications: Option<Vec<String>>,
    pub available_start: Option<String>,
    pub available_end: Option<String>,
    pub available_areas: Option<Vec<String>>,
    pub notes: Option<String>,
}

pub fn update_member(
    store: &mut Store,
    storage: &impl Storage,
    parameters: UpdateMemberParameters,
) -> Result<Member, UpdateMemberError> {
    let current = find_active_member(store, &parameters.member)?.clone();

    let name = match parameters.name {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(UpdateMemberError::EmptyName);
            }
            let taken = store.get_active_members().any(|m| {
                m.id != current.id && m.name.to_lowercase() == name.to_lowercase()
            });
            if taken {
                return Err(UpdateMemberError::MemberAlreadyExists(name));
            }
            name
        }
        None => current.name.clone(),
    };

    let available_hours = WorkTime::new(
        parameters
            .available_start
            .unwrap_or_else(|| current.available_hours.start.clone()),
        parameters
            .available_end
            .unwrap_or_else(|| current.available_hours.end.clone()),
    );
    available_hours.window()?;

    let updated = Member {
        name,
        team: parameters.team.unwrap_or(current.team),
        qualifications: parameters.qualifications.unwrap_or(current.qualifications),
        available_hours,
        available_areas: parameters.available_areas.unwrap_or(current.available_areas),
        notes: merge_notes(parameters.notes, current.notes),
        updated_at: jiff::Timestamp::now(),
        ..current
    };

    if let Some(member) = store.get_member_mut(updated.id) {
        *member = updated.clone();
    }
    storage.save(store)?;

    info!(member = %updated.name, id = %updated.id, "member updated");
    Ok(updated)
}

#[derive(Debug, Error)]
pub enum DeleteMemberError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteMemberParameters {
    pub name: String,
}

pub struct DeleteMemberResult {
    pub member: Member,
    /// Active projects that still reference the member
    pub affected_projects_count: usize,
}

/// Soft delete. Assignments are kept so a restore brings them back; the
/// schedule ignores them while the member is deleted.
pub fn delete_member(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteMemberParameters,
) -> Result<DeleteMemberResult, DeleteMemberError> {
    let member_id = find_active_member(store, &parameters.name)?.id;
    let affected_projects_count = store.get_projects_for_member(member_id).count();

    let Some(member) = store.get_member_mut(member_id) else {
        return Err(missing(&parameters.name).into());
    };
    let now = jiff::Timestamp::now();
    member.deleted_at = Some(now);
    member.updated_at = now;
    let member = member.clone();

    storage.save(store)?;

    info!(member = %member.name, id = %member.id, "member deleted");
    Ok(DeleteMemberResult {
        member,
        affected_projects_count,
    })
}

#[derive(Debug, Error)]
pub enum RestoreMemberError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Member with name '{0}' already exists")]
    NameTaken(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct RestoreMemberParameters {
    pub name: String,
}

pub fn restore_member(
    store: &mut Store,
    storage: &impl Storage,
    parameters: RestoreMemberParameters,
) -> Result<Member, RestoreMemberError> {
    let deleted = find_by_name(
        store.get_deleted_members(),
        &parameters.name,
        "Deleted member",
        |m| m.name.as_str(),
    )?;
    let member_id = deleted.id;

    if store
        .get_active_members()
        .any(|m| m.name.to_lowercase() == deleted.name.to_lowercase())
    {
        return Err(RestoreMemberError::NameTaken(deleted.name.clone()));
    }

    let Some(member) = store.get_member_mut(member_id) else {
        return Err(missing(&parameters.name).into());
    };
    member.deleted_at = None;
    member.updated_at = jiff::Timestamp::now();
    let member = member.clone();

    storage.save(store)?;

    info!(member = %member.name, id = %member.id, "member restored");
    Ok(member)
}
