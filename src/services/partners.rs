use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    models::{
        partner::{ExternalPartner, PartnerAssignment},
        project::Project,
        store::Store,
    },
    services::{LookupError, find_by_name, projects::find_active_project},
    storage::{Storage, StorageError},
};

pub fn find_active_partner<'a>(
    store: &'a Store,
    query: &str,
) -> Result<&'a ExternalPartner, LookupError> {
    find_by_name(store.get_active_partners(), query, "Partner", |p| p.name.as_str())
}

#[derive(Debug, Error)]
pub enum PartnerError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Partner name cannot be empty")]
    EmptyName,

    #[error("Partner with name '{0}' already exists")]
    PartnerAlreadyExists(String),

    #[error("A partner must send at least one person")]
    ZeroMembers,

    #[error("Representative name cannot be empty")]
    EmptyRepresentative,

    #[error("Partner '{partner}' is not assigned to project '{project}'")]
    PartnerNotAssigned { partner: String, project: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

fn name_taken(store: &Store, name: &str) -> bool {
    store
        .get_active_partners()
        .any(|p| p.name.to_lowercase() == name.to_lowercase())
}

pub struct CreatePartnerParameters {
    pub name: String,
}

pub fn create_partner(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreatePartnerParameters,
) -> Result<ExternalPartner, PartnerError> {
    let name = parameters.name.trim().to_string();
    if name.is_empty() {
        return Err(PartnerError::EmptyName);
    }
    if name_taken(store, &name) {
        return Err(PartnerError::PartnerAlreadyExists(name));
    }

    let now = jiff::Timestamp::now();
    let partner = ExternalPartner {
        id: Uuid::new_v4(),
        name,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    };

    store.add_partner(partner.clone());
    storage.save(store)?;

    info!(partner = %partner.name, "partner created");
    Ok(partner)
}

pub struct DeletePartnerParameters {
    pub name: String,
}

/// Soft delete; placements on projects are kept
pub fn delete_partner(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeletePartnerParameters,
) -> Result<ExternalPartner, PartnerError> {
    let partner_id = find_active_partner(store, &parameters.name)?.id;
    set_deleted(store, storage, partner_id, Some(jiff::Timestamp::now()), &parameters.name)
}

pub struct RestorePartnerParameters {
    pub name: String,
}

pub fn restore_partner(
    store: &mut Store,
    storage: &impl Storage,
    parameters: RestorePartnerParameters,
) -> Result<ExternalPartner, PartnerError> {
    let deleted = find_by_name(
        store.get_deleted_partners(),
        &parameters.name,
        "Deleted partner",
        |p| p.name.as_str(),
    )?;
    if name_taken(store, &deleted.name) {
        return Err(PartnerError::PartnerAlreadyExists(deleted.name.clone()));
    }
    let partner_id = deleted.id;
    set_deleted(store, storage, partner_id, None, &parameters.name)
}

fn set_deleted(
    store: &mut Store,
    storage: &impl Storage,
    partner_id: Uuid,
    deleted_at: Option<jiff::Timestamp>,
    query: &str,
) -> Result<ExternalPartner, PartnerError> {
    let Some(partner) = store.get_partner_mut(partner_id) else {
        return Err(LookupError::NotFound {
            kind: "Partner",
            query: query.to_string(),
        }
        .into());
    };
    partner.deleted_at = deleted_at;
    partner.updated_at = jiff::Timestamp::now();
    let partner = partner.clone();

    storage.save(store)?;

    info!(partner = %partner.name, active = partner.is_active(), "partner status changed");
    Ok(partner)
}

pub struct AssignPartnerParameters {
    pub project: String,
    pub partner: String,
    pub member_count: u32,
    pub representative_name: String,
}

/// Adds the partner to the project or updates its existing placement
pub fn assign_partner(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AssignPartnerParameters,
) -> Result<Project, PartnerError> {
    if parameters.member_count == 0 {
        return Err(PartnerError::ZeroMembers);
    }
    let representative_name = parameters.representative_name.trim().to_string();
    if representative_name.is_empty() {
        return Err(PartnerError::EmptyRepresentative);
    }

    let project_id = find_active_project(store, &parameters.project)?.id;
    let partner = find_active_partner(store, &parameters.partner)?.clone();

    let assignment = PartnerAssignment {
        partner_id: partner.id,
        member_count: parameters.member_count,
        representative_name,
    };

    let Some(project) = store.get_project_mut(project_id) else {
        return Err(LookupError::NotFound {
            kind: "Project",
            query: parameters.project,
        }
        .into());
    };
    match project
        .external_partners
        .iter_mut()
        .find(|a| a.partner_id == partner.id)
    {
        Some(existing) => *existing = assignment,
        None => project.external_partners.push(assignment),
    }
    project.updated_at = jiff::Timestamp::now();
    let project = project.clone();

    storage.save(store)?;

    info!(partner = %partner.name, project = %project.name, "partner placed");
    Ok(project)
}

pub struct UnassignPartnerParameters {
    pub project: String,
    pub partner: String,
}

pub fn unassign_partner(
    store: &mut Store,
    storage: &impl Storage,
    parameters: UnassignPartnerParameters,
) -> Result<Project, PartnerError> {
    let project_id = find_active_project(store, &parameters.project)?.id;
    let partner = find_active_partner(store, &parameters.partner)?.clone();

    let Some(project) = store.get_project_mut(project_id) else {
        return Err(LookupError::NotFound {
            kind: "Project",
            query: parameters.project,
        }
        .into());
    };
    let before = project.external_partners.len();
    project.external_partners.retain(|a| a.partner_id != partner.id);
    if project.external_partners.len() == before {
        return Err(PartnerError::PartnerNotAssigned {
            partner: partner.name,
            project: project.name.clone(),
        });
    }
    project.updated_at = jiff::Timestamp::now();
    let project = project.clone();

    storage.save(store)?;

    info!(partner = %partner.name, project = %project.name, "partner removed");
    Ok(project)
}
