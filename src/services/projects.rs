use jiff::civil::Date;
use slug::slugify;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    models::{
        project::Project,
        store::Store,
        work_time::{WorkTime, WorkTimeError},
    },
    services::{LookupError, find_by_name, merge_notes},
    storage::{Storage, StorageError},
};

/// Slugs carry the date so a recurring job gets one slug per day
pub fn project_slug(date: Date, name: &str) -> String {
    slugify(format!("{date} {name}"))
}

fn find_project<'a>(
    projects: impl Iterator<Item = &'a Project>,
    query: &str,
    kind: &'static str,
) -> Result<&'a Project, LookupError> {
    let projects: Vec<&Project> = projects.collect();
    let by_slug = query.to_lowercase();
    if let Some(project) = projects.iter().find(|p| p.slug == by_slug) {
        return Ok(*project);
    }
    find_by_name(projects, query, kind, |p| p.name.as_str())
}

/// Resolve an active project by slug or (partial) name
pub fn find_active_project<'a>(store: &'a Store, query: &str) -> Result<&'a Project, LookupError> {
    find_project(store.get_active_projects(), query, "Project")
}

fn missing(query: &str) -> LookupError {
    LookupError::NotFound {
        kind: "Project",
        query: query.to_string(),
    }
}

fn parse_date(value: &str) -> Result<Date, String> {
    value.trim().parse::<Date>().map_err(|e| e.to_string())
}

#[derive(Debug, Error)]
pub enum CreateProjectError {
    #[error("Project name cannot be empty")]
    EmptyName,

    #[error("Project '{0}' already exists on that date")]
    ProjectAlreadyExists(String),

    #[error("Invalid project date '{0}': {1}")]
    InvalidDate(String, String),

    #[error("Invalid work time: {0}")]
    InvalidWorkTime(#[from] WorkTimeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreateProjectParameters {
    pub name: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub location: String,
    pub work_content: String,
    pub required_members: u32,
    pub notes: Option<String>,
}

pub fn create_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreateProjectParameters,
) -> Result<Project, CreateProjectError> {
    let name = parameters.name.trim().to_string();
    if name.is_empty() {
        return Err(CreateProjectError::EmptyName);
    }

    let date = parse_date(&parameters.date)
        .map_err(|e| CreateProjectError::InvalidDate(parameters.date.clone(), e))?;

    let work_time = WorkTime::new(parameters.start, parameters.end);
    work_time.window()?;

    let slug = project_slug(date, &name);
    if store.get_active_projects().any(|p| p.slug == slug) {
        return Err(CreateProjectError::ProjectAlreadyExists(name));
    }

    let now = jiff::Timestamp::now();
    let project = Project {
        id: Uuid::new_v4(),
        name,
        slug,
        date,
        work_time,
        location: parameters.location,
        work_content: parameters.work_content,
        required_members: parameters.required_members,
        notes: merge_notes(parameters.notes, None),
        assigned_members: vec![],
        lead_member_id: None,
        external_partners: vec![],
        deleted_at: None,
        created_at: now,
        updated_at: now,
    };

    store.add_project(project.clone());
    storage.save(store)?;

    info!(project = %project.name, date = %project.date, "project created");
    Ok(project)
}

#[derive(Debug, Error)]
pub enum UpdateProjectError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Project name cannot be empty")]
    EmptyName,

    #[error("Project '{0}' already exists on that date")]
    ProjectAlreadyExists(String),

    #[error("Invalid project date '{0}': {1}")]
    InvalidDate(String, String),

    #[error("Invalid work time: {0}")]
    InvalidWorkTime(#[from] WorkTimeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// `None` fields are left untouched
#[derive(Default)]
pub struct UpdateProjectParameters {
    pub project: String,
    pub name: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub work_content: Option<String>,
    pub required_members: Option<u32>,
    pub notes: Option<String>,
}

pub fn update_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: UpdateProjectParameters,
) -> Result<Project, UpdateProjectError> {
    let current = find_active_project(store, &parameters.project)?.clone();

    let name = match parameters.name {
        Some(name) if name.trim().is_empty() => return Err(UpdateProjectError::EmptyName),
        Some(name) => name.trim().to_string(),
        None => current.name.clone(),
    };

    let date = match parameters.date {
        Some(value) => {
            parse_date(&value).map_err(|e| UpdateProjectError::InvalidDate(value.clone(), e))?
        }
        None => current.date,
    };

    let work_time = WorkTime::new(
        parameters
            .start
            .unwrap_or_else(|| current.work_time.start.clone()),
        parameters
            .end
            .unwrap_or_else(|| current.work_time.end.clone()),
    );
    work_time.window()?;

    let slug = project_slug(date, &name);
    if store
        .get_active_projects()
        .any(|p| p.id != current.id && p.slug == slug)
    {
        return Err(UpdateProjectError::ProjectAlreadyExists(name));
    }

    let updated = Project {
        name,
        slug,
        date,
        work_time,
        location: parameters.location.unwrap_or(current.location),
        work_content: parameters.work_content.unwrap_or(current.work_content),
        required_members: parameters
            .required_members
            .unwrap_or(current.required_members),
        notes: merge_notes(parameters.notes, current.notes),
        updated_at: jiff::Timestamp::now(),
        ..current
    };

    if let Some(project) = store.get_project_mut(updated.id) {
        *project = updated.clone();
    }
    storage.save(store)?;

    info!(project = %updated.name, date = %updated.date, "project updated");
    Ok(updated)
}

#[derive(Debug, Error)]
pub enum DeleteProjectError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteProjectParameters {
    pub name: String,
}

pub fn delete_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteProjectParameters,
) -> Result<Project, DeleteProjectError> {
    let project_id = find_active_project(store, &parameters.name)?.id;

    let Some(project) = store.get_project_mut(project_id) else {
        return Err(missing(&parameters.name).into());
    };
    let now = jiff::Timestamp::now();
    project.deleted_at = Some(now);
    project.updated_at = now;
    let project = project.clone();

    storage.save(store)?;

    info!(project = %project.name, date = %project.date, "project deleted");
    Ok(project)
}

#[derive(Debug, Error)]
pub enum RestoreProjectError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Project '{0}' already exists on that date")]
    SlugTaken(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct RestoreProjectParameters {
    pub name: String,
}

pub fn restore_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: RestoreProjectParameters,
) -> Result<Project, RestoreProjectError> {
    let deleted = find_project(store.get_deleted_projects(), &parameters.name, "Deleted project")?;
    let project_id = deleted.id;

    if store.get_active_projects().any(|p| p.slug == deleted.slug) {
        return Err(RestoreProjectError::SlugTaken(deleted.name.clone()));
    }

    // Assignments are restored as they were; members deleted in the meantime
    // stay invisible to the schedule.
    let Some(project) = store.get_project_mut(project_id) else {
        return Err(missing(&parameters.name).into());
    };
    project.deleted_at = None;
    project.updated_at = jiff::Timestamp::now();
    let project = project.clone();

    storage.save(store)?;

    info!(project = %project.name, date = %project.date, "project restored");
    Ok(project)
}
