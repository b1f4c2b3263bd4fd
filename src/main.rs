use std::fmt::Display;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;
use jiff::civil::Date;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    conflicts::overlaps,
    models::store::Store,
    schedule::Schedule,
    services::{
        LookupError,
        assignments::{
            AssignMemberParameters, AssignmentError, MoveMemberParameters,
            ReplaceMemberParameters, SetLeadParameters, UnassignMemberParameters, assign_member,
            move_member, replace_member, set_lead, unassign_member,
        },
        members::{
            CreateMemberParameters, DeleteMemberParameters, RestoreMemberParameters,
            UpdateMemberParameters, create_member, delete_member, find_active_member,
            restore_member, update_member,
        },
        partners::{
            AssignPartnerParameters, CreatePartnerParameters, DeletePartnerParameters,
            PartnerError, RestorePartnerParameters, UnassignPartnerParameters, assign_partner,
            create_partner, delete_partner, restore_partner, unassign_partner,
        },
        projects::{
            CreateProjectParameters, DeleteProjectParameters, RestoreProjectParameters,
            UpdateProjectParameters, create_project, delete_project, find_active_project,
            restore_project, update_project,
        },
    },
    storage::{Storage, json::JsonFileStorage},
};

mod config;
mod conflicts;
mod models;
mod schedule;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "rota",
    about = "Staff field projects and catch double-booked members"
)]
struct Cli {
    /// Store file (defaults to $ROTA_STORE, then the user data directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Overview: counts, double-bookings and upcoming projects
    Dashboard,

    /// Show the projects of one day with their staff
    Board {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Only list unassigned members whose name contains this
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List every double-booking
    Conflicts {
        /// Only this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether two HH:MM windows overlap
    Overlap {
        start1: String,
        end1: String,
        start2: String,
        end2: String,
    },

    /// Manage members
    #[command(subcommand)]
    Member(MemberCommands),

    /// Manage projects and their staff
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage external partners
    #[command(subcommand)]
    Partner(PartnerCommands),
}

#[derive(Debug, Subcommand)]
enum MemberCommands {
    /// Add a member
    New {
        name: String,

        #[arg(short, long, default_value = "")]
        team: String,

        /// Qualification (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        qualification: Vec<String>,

        /// Start of available hours (HH:MM)
        #[arg(long)]
        from: Option<String>,

        /// End of available hours (HH:MM)
        #[arg(long)]
        until: Option<String>,

        /// Area the member can cover (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        area: Vec<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Edit a member
    Edit {
        member: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        team: Option<String>,

        /// Replace qualifications (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        qualification: Vec<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        until: Option<String>,

        /// Replace areas (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        area: Vec<String>,

        /// New notes; pass "" to clear them
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete a member
    Delete { name: String },
    /// Restore a deleted member
    Restore { name: String },
    /// List members
    List {
        /// Show deleted members instead
        #[arg(long)]
        deleted: bool,
    },
    /// Show a member and their projects
    View { name: String },
}

#[derive(Debug, Subcommand)]
enum ProjectCommands {
    /// Create a project
    New {
        name: String,

        /// Day of the work (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Start time (HH:MM)
        #[arg(short, long)]
        start: String,

        /// End time (HH:MM)
        #[arg(short, long)]
        end: String,

        #[arg(short, long, default_value = "")]
        location: String,

        /// What the work is about
        #[arg(short, long, default_value = "")]
        content: String,

        /// Headcount needed
        #[arg(short, long, default_value_t = 1)]
        required: u32,

        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Edit a project
    Edit {
        project: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(short, long)]
        required: Option<u32>,

        /// New notes; pass "" to clear them
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete a project
    Delete { name: String },
    /// Restore a deleted project
    Restore { name: String },
    /// List projects
    List {
        /// Only this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Show deleted projects instead
        #[arg(long)]
        deleted: bool,
    },
    /// Show a project with its staff
    View { name: String },
    /// Put a member on a project
    Assign { project: String, member: String },
    /// Take a member off a project
    Unassign { project: String, member: String },
    /// Move a member between projects or to/from the unassigned pool
    Move {
        member: String,

        /// Source project (omit for the unassigned pool)
        #[arg(long)]
        from: Option<String>,

        /// Destination project (omit for the unassigned pool)
        #[arg(long)]
        to: Option<String>,
    },
    /// Swap a member on a project for someone else
    Replace {
        project: String,
        member: String,
        replacement: String,
    },
    /// Set or clear the lead of a project
    Lead {
        project: String,

        /// Member to lead (omit to clear)
        member: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum PartnerCommands {
    /// Add a partner
    New { name: String },
    /// Delete a partner
    Delete { name: String },
    /// Restore a deleted partner
    Restore { name: String },
    /// List partners
    List {
        #[arg(long)]
        deleted: bool,
    },
    /// Place partner staff on a project (updates an existing placement)
    Assign {
        project: String,
        partner: String,

        /// Number of people the partner sends
        #[arg(short, long, default_value_t = 1)]
        count: u32,

        /// Partner's representative on site
        #[arg(short, long)]
        rep: String,
    },
    /// Remove a partner from a project
    Unassign { project: String, partner: String },
}

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("rota=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn fail(context: &str, error: impl Display) -> ! {
    eprintln!("Error: {}: {}", context, error);
    std::process::exit(1);
}

/// Print a lookup failure with the candidates the user could have meant
fn fail_lookup(error: &LookupError, candidates: Vec<String>) -> ! {
    match error {
        LookupError::NotFound { .. } => {
            eprintln!("Error: {}", error);
            if !candidates.is_empty() {
                eprintln!("\nAvailable:");
                for name in candidates {
                    eprintln!("  - {}", name);
                }
            }
        }
        LookupError::Ambiguous { names, .. } => {
            eprintln!("Error: Name is ambiguous. Multiple matches found:");
            for name in names {
                eprintln!("  - {}", name);
            }
            eprintln!("\nPlease be more specific.");
        }
    }
    std::process::exit(1);
}

fn member_names(store: &Store) -> Vec<String> {
    store.get_active_members().map(|m| m.name.clone()).collect()
}

fn project_names(store: &Store) -> Vec<String> {
    store
        .get_active_projects()
        .map(|p| format!("{} ({})", p.name, p.slug))
        .collect()
}

fn parse_date_arg(value: Option<String>) -> Date {
    match value {
        Some(value) => value.parse().unwrap_or_else(|e| {
            eprintln!("Error: Invalid date '{}': {}", value, e);
            eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2025-06-01)");
            std::process::exit(1);
        }),
        None => jiff::Zoned::now().date(),
    }
}

fn build_schedule(store: &Store) -> Schedule {
    Schedule::from_store(store).unwrap_or_else(|e| fail("Cannot compute the schedule", e))
}

/// Recompute the schedule after a change and warn about double-bookings on `date`
fn warn_conflicts_on(store: &Store, date: Date) {
    let schedule = build_schedule(store);
    let alerts: Vec<_> = schedule.conflicts_on(date).collect();
    if !alerts.is_empty() {
        tracing::warn!(date = %date, conflicts = alerts.len(), "double-bookings after change");
        ui::render_conflict_banners(alerts);
    }
}

fn main() {
    let cli = Cli::parse();

    let config = Config::resolve(cli.store, cli.verbose)
        .unwrap_or_else(|e| fail("Invalid configuration", e));
    init_tracing(&config.log_filter);

    let storage = JsonFileStorage::new(config.store_path);
    tracing::debug!(path = %storage.path().display(), "using store");

    let mut store = storage
        .load()
        .unwrap_or_else(|e| fail("Failed to load store", e));

    match cli.command {
        None | Some(Commands::Dashboard) => render_dashboard(&store),
        Some(Commands::Board { date, search }) => {
            let date = parse_date_arg(date);
            render_board(&store, date, search.as_deref());
        }
        Some(Commands::Conflicts { date, json }) => {
            let schedule = build_schedule(&store);
            let alerts: Vec<_> = match date {
                Some(value) => schedule.conflicts_on(parse_date_arg(Some(value))).collect(),
                None => schedule.conflicts().iter().collect(),
            };

            if json {
                match serde_json::to_string_pretty(&alerts) {
                    Ok(output) => println!("{}", output),
                    Err(e) => fail("Failed to serialize conflicts", e),
                }
            } else if alerts.is_empty() {
                println!("No double-bookings");
            } else {
                ui::render_view_header("Double-bookings", alerts.len(), "conflict", "conflicts");
                for alert in alerts {
                    ui::render_conflict_banner(alert);
                }
            }
        }
        Some(Commands::Overlap {
            start1,
            end1,
            start2,
            end2,
        }) => match overlaps(&start1, &end1, &start2, &end2) {
            Ok(true) => println!(
                "{} {}-{} and {}-{} overlap",
                "●".red(),
                start1,
                end1,
                start2,
                end2
            ),
            Ok(false) => println!("○ {}-{} and {}-{} do not overlap", start1, end1, start2, end2),
            Err(e) => fail("Cannot compare windows", e),
        },
        Some(Commands::Member(command)) => run_member_command(&mut store, &storage, command),
        Some(Commands::Project(command)) => run_project_command(&mut store, &storage, command),
        Some(Commands::Partner(command)) => run_partner_command(&mut store, &storage, command),
    }
}

fn render_dashboard(store: &Store) {
    let schedule = build_schedule(store);
    let conflicts = schedule.conflicts();

    println!("\n  {}\n", "ROTA".cyan().bold());
    println!("  Projects   {}", schedule.projects().len().to_string().bold());
    println!("  Members    {}", schedule.members().len().to_string().bold());
    println!(
        "  Partners   {}",
        store.get_active_partners().count().to_string().bold()
    );
    let conflict_count = conflicts.len().to_string();
    println!(
        "  Conflicts  {}",
        if conflicts.is_empty() {
            conflict_count.dimmed()
        } else {
            conflict_count.red().bold()
        }
    );

    if !conflicts.is_empty() {
        ui::render_section_header("Double-bookings");
        for alert in conflicts.iter().take(3) {
            ui::render_conflict_banner(alert);
        }
        if conflicts.len() > 3 {
            println!(
                "\n  {}",
                format!("{} more, see `rota conflicts`", conflicts.len() - 3).dimmed()
            );
        }
    }

    let today = jiff::Zoned::now().date();
    let mut upcoming: Vec<_> = schedule
        .projects()
        .iter()
        .filter(|p| p.date >= today)
        .collect();
    upcoming.sort_by(|a, b| (a.date, &a.work_time.start).cmp(&(b.date, &b.work_time.start)));

    if !upcoming.is_empty() {
        ui::render_section_header("Upcoming");
        let mut current_date = None;
        for project in upcoming.into_iter().take(10) {
            if current_date != Some(project.date) {
                current_date = Some(project.date);
                println!("  {}", ui::format_date_header(project.date).cyan());
            }
            ui::render_project_line(project, &schedule);
        }
    }
    println!();
}

fn render_board(store: &Store, date: Date, search: Option<&str>) {
    let schedule = build_schedule(store);
    let projects = schedule.projects_on(date);

    ui::render_view_header(
        &ui::format_date_header(date),
        projects.len(),
        "project",
        "projects",
    );

    for project in &projects {
        ui::render_project_block(project, &schedule, store);
    }

    let unassigned = schedule.unassigned_members_on(date, search);
    ui::render_section_header(&format!("Unassigned ({})", unassigned.len()));
    if unassigned.is_empty() {
        println!("  {}", "everyone is busy".dimmed());
    }
    for member in unassigned {
        ui::render_member_summary(member, false);
    }

    ui::render_conflict_banners(schedule.conflicts_on(date));
    println!();
}

fn run_member_command(store: &mut Store, storage: &impl Storage, command: MemberCommands) {
    match command {
        MemberCommands::New {
            name,
            team,
            qualification,
            from,
            until,
            area,
            notes,
        } => {
            let params = CreateMemberParameters {
                name,
                team,
                qualifications: qualification,
                available_start: from,
                available_end: until,
                available_areas: area,
                notes,
            };
            match create_member(store, storage, params) {
                Ok(member) => {
                    println!("✓ Member {} created", member.name);
                    println!("  available {}", member.available_hours);
                }
                Err(e) => fail("Failed to create member", e),
            }
        }
        MemberCommands::Edit {
            member,
            name,
            team,
            qualification,
            from,
            until,
            area,
            notes,
        } => {
            let params = UpdateMemberParameters {
                member,
                name,
                team,
                qualifications: (!qualification.is_empty()).then_some(qualification),
                available_start: from,
                available_end: until,
                available_areas: (!area.is_empty()).then_some(area),
                notes,
            };
            match update_member(store, storage, params) {
                Ok(member) => println!("✓ Member {} updated", member.name),
                Err(services::members::UpdateMemberError::Lookup(e)) => {
                    fail_lookup(&e, member_names(store))
                }
                Err(e) => fail("Failed to update member", e),
            }
        }
        MemberCommands::Delete { name } => {
            match delete_member(store, storage, DeleteMemberParameters { name }) {
                Ok(result) => {
                    println!("✓ Member deleted: {}", result.member.name);
                    if result.affected_projects_count > 0 {
                        println!(
                            "  └─ still listed on {} project(s); hidden until restored",
                            result.affected_projects_count
                        );
                    }
                }
                Err(services::members::DeleteMemberError::Lookup(e)) => {
                    fail_lookup(&e, member_names(store))
                }
                Err(e) => fail("Failed to delete member", e),
            }
        }
        MemberCommands::Restore { name } => {
            match restore_member(store, storage, RestoreMemberParameters { name }) {
                Ok(member) => println!("✓ Member restored: {}", member.name),
                Err(services::members::RestoreMemberError::Lookup(e)) => {
                    let deleted = store.get_deleted_members().map(|m| m.name.clone()).collect();
                    fail_lookup(&e, deleted)
                }
                Err(e) => fail("Failed to restore member", e),
            }
        }
        MemberCommands::List { deleted } => {
            let schedule = build_schedule(store);
            let mut members: Vec<_> = if deleted {
                store.get_deleted_members().collect()
            } else {
                store.get_active_members().collect()
            };

            if members.is_empty() {
                println!("No members found");
                return;
            }

            members.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            let title = if deleted { "DELETED MEMBERS" } else { "MEMBERS" };
            ui::render_view_header(title, members.len(), "member", "members");
            for member in members {
                ui::render_member_summary(member, schedule.member_has_conflict(member.id));
            }
        }
        MemberCommands::View { name } => {
            let member = match find_active_member(store, &name) {
                Ok(member) => member,
                Err(e) => fail_lookup(&e, member_names(store)),
            };
            let schedule = build_schedule(store);

            ui::render_section_header(&member.name);
            if !member.team.is_empty() {
                println!("  Team           {}", member.team);
            }
            println!("  Available      {}", member.available_hours);
            if !member.qualifications.is_empty() {
                println!("  Qualifications {}", member.qualifications.join(", "));
            }
            if !member.available_areas.is_empty() {
                println!("  Areas          {}", member.available_areas.join(", "));
            }
            if let Some(notes) = &member.notes {
                println!("  Notes          {}", notes.dimmed());
            }

            let mut projects: Vec<_> = store.get_projects_for_member(member.id).collect();
            projects.sort_by(|a, b| (a.date, &a.work_time.start).cmp(&(b.date, &b.work_time.start)));

            ui::render_section_header(&format!("Projects ({})", projects.len()));
            for project in projects {
                println!("  {}", project.date.to_string().dimmed());
                ui::render_project_line(project, &schedule);
            }

            ui::render_conflict_banners(
                schedule
                    .conflicts()
                    .iter()
                    .filter(|c| c.member_id == member.id),
            );
            println!();
        }
    }
}

fn run_project_command(store: &mut Store, storage: &impl Storage, command: ProjectCommands) {
    match command {
        ProjectCommands::New {
            name,
            date,
            start,
            end,
            location,
            content,
            required,
            notes,
        } => {
            let params = CreateProjectParameters {
                name,
                date,
                start,
                end,
                location,
                work_content: content,
                required_members: required,
                notes,
            };
            match create_project(store, storage, params) {
                Ok(project) => {
                    println!(
                        "✓ Project {} created with slug {}",
                        project.name, project.slug
                    );
                    println!("  {} {}", project.date, project.work_time);
                }
                Err(e) => fail("Failed to create project", e),
            }
        }
        ProjectCommands::Edit {
            project,
            name,
            date,
            start,
            end,
            location,
            content,
            required,
            notes,
        } => {
            let params = UpdateProjectParameters {
                project,
                name,
                date,
                start,
                end,
                location,
                work_content: content,
                required_members: required,
                notes,
            };
            match update_project(store, storage, params) {
                Ok(project) => {
                    println!("✓ Project {} updated", project.name);
                    warn_conflicts_on(store, project.date);
                }
                Err(services::projects::UpdateProjectError::Lookup(e)) => {
                    fail_lookup(&e, project_names(store))
                }
                Err(e) => fail("Failed to update project", e),
            }
        }
        ProjectCommands::Delete { name } => {
            match delete_project(store, storage, DeleteProjectParameters { name }) {
                Ok(project) => println!("✓ Project deleted: {}", project.name),
                Err(services::projects::DeleteProjectError::Lookup(e)) => {
                    fail_lookup(&e, project_names(store))
                }
                Err(e) => fail("Failed to delete project", e),
            }
        }
        ProjectCommands::Restore { name } => {
            match restore_project(store, storage, RestoreProjectParameters { name }) {
                Ok(project) => {
                    println!("✓ Project restored: {}", project.name);
                    warn_conflicts_on(store, project.date);
                }
                Err(services::projects::RestoreProjectError::Lookup(e)) => {
                    let deleted = store.get_deleted_projects().map(|p| p.name.clone()).collect();
                    fail_lookup(&e, deleted)
                }
                Err(e) => fail("Failed to restore project", e),
            }
        }
        ProjectCommands::List { date, deleted } => {
            let schedule = build_schedule(store);
            let date = date.map(|d| parse_date_arg(Some(d)));
            let mut projects: Vec<_> = if deleted {
                store.get_deleted_projects().collect()
            } else {
                store.get_active_projects().collect()
            };
            projects.retain(|p| date.is_none_or(|d| p.date == d));

            if projects.is_empty() {
                println!("No projects found");
                return;
            }

            projects.sort_by(|a, b| (a.date, &a.work_time.start).cmp(&(b.date, &b.work_time.start)));
            let title = if deleted { "DELETED PROJECTS" } else { "PROJECTS" };
            ui::render_view_header(title, projects.len(), "project", "projects");

            let mut current_date = None;
            for project in projects {
                if current_date != Some(project.date) {
                    current_date = Some(project.date);
                    println!("  {}", ui::format_date_header(project.date).cyan());
                }
                ui::render_project_line(project, &schedule);
            }
        }
        ProjectCommands::View { name } => {
            let project = match find_active_project(store, &name) {
                Ok(project) => project,
                Err(e) => fail_lookup(&e, project_names(store)),
            };
            let schedule = build_schedule(store);

            ui::render_section_header(&format!("{} · {}", project.date, project.slug));
            ui::render_project_block(project, &schedule, store);
            if let Some(lead) = project.lead_member_id.and_then(|id| store.get_member(id)) {
                println!("  Lead   {}", lead.name);
            }
            if !project.work_content.is_empty() {
                println!("  Work   {}", project.work_content);
            }
            if let Some(notes) = &project.notes {
                println!("  Notes  {}", notes.dimmed());
            }

            ui::render_conflict_banners(
                schedule
                    .conflicts()
                    .iter()
                    .filter(|c| c.date == project.date && c.involves_project(&project.name)),
            );
            println!();
        }
        ProjectCommands::Assign { project, member } => {
            match assign_member(store, storage, AssignMemberParameters { project, member }) {
                Ok(change) if change.changed => {
                    println!("✓ {} assigned to {}", change.member.name, change.project.name);
                    warn_conflicts_on(store, change.project.date);
                }
                Ok(change) => println!(
                    "{} is already assigned to {}",
                    change.member.name, change.project.name
                ),
                Err(e) => fail_assignment(store, e),
            }
        }
        ProjectCommands::Unassign { project, member } => {
            match unassign_member(store, storage, UnassignMemberParameters { project, member }) {
                Ok(change) => {
                    println!("✓ {} removed from {}", change.member.name, change.project.name)
                }
                Err(e) => fail_assignment(store, e),
            }
        }
        ProjectCommands::Move { member, from, to } => {
            match move_member(store, storage, MoveMemberParameters { member, from, to }) {
                Ok(result) if !result.changed => {
                    if let Some(destination) = &result.to {
                        println!(
                            "{} is already assigned to {}",
                            result.member.name, destination.name
                        );
                    }
                }
                Ok(result) => {
                    let describe = |p: &Option<models::project::Project>| {
                        p.as_ref()
                            .map(|p| p.name.clone())
                            .unwrap_or_else(|| String::from("unassigned"))
                    };
                    println!(
                        "✓ {} moved: {} → {}",
                        result.member.name,
                        describe(&result.from),
                        describe(&result.to)
                    );
                    if let Some(destination) = &result.to {
                        warn_conflicts_on(store, destination.date);
                    }
                }
                Err(e) => fail_assignment(store, e),
            }
        }
        ProjectCommands::Replace {
            project,
            member,
            replacement,
        } => {
            let params = ReplaceMemberParameters {
                project,
                member,
                replacement,
            };
            match replace_member(store, storage, params) {
                Ok(result) => {
                    println!(
                        "✓ {} replaced by {} on {}",
                        result.removed.name, result.added.name, result.project.name
                    );
                    if result.lead_cleared {
                        println!("  └─ {} was the lead; project has no lead now", result.removed.name);
                    }
                    warn_conflicts_on(store, result.project.date);
                }
                Err(e) => fail_assignment(store, e),
            }
        }
        ProjectCommands::Lead { project, member } => {
            match set_lead(store, storage, SetLeadParameters { project, member }) {
                Ok(result) => match result.lead {
                    Some(lead) => println!("✓ {} now leads {}", lead.name, result.project.name),
                    None => println!("✓ Lead cleared on {}", result.project.name),
                },
                Err(e) => fail_assignment(store, e),
            }
        }
    }
}

fn fail_assignment(store: &Store, error: AssignmentError) -> ! {
    match &error {
        AssignmentError::Lookup(e @ LookupError::NotFound { kind, .. }) => {
            let candidates = if *kind == "Member" {
                member_names(store)
            } else {
                project_names(store)
            };
            fail_lookup(e, candidates)
        }
        AssignmentError::Lookup(e) => fail_lookup(e, vec![]),
        _ => fail("Assignment failed", &error),
    }
}

fn run_partner_command(store: &mut Store, storage: &impl Storage, command: PartnerCommands) {
    let result = match command {
        PartnerCommands::New { name } => create_partner(store, storage, CreatePartnerParameters { name })
            .map(|partner| println!("✓ Partner {} created", partner.name)),
        PartnerCommands::Delete { name } => {
            delete_partner(store, storage, DeletePartnerParameters { name })
                .map(|partner| println!("✓ Partner deleted: {}", partner.name))
        }
        PartnerCommands::Restore { name } => {
            restore_partner(store, storage, RestorePartnerParameters { name })
                .map(|partner| println!("✓ Partner restored: {}", partner.name))
        }
        PartnerCommands::List { deleted } => {
            let mut partners: Vec<_> = if deleted {
                store.get_deleted_partners().collect()
            } else {
                store.get_active_partners().collect()
            };

            if partners.is_empty() {
                println!("No partners found");
                return;
            }

            partners.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            let title = if deleted { "DELETED PARTNERS" } else { "PARTNERS" };
            ui::render_view_header(title, partners.len(), "partner", "partners");
            for partner in partners {
                let placements = store
                    .get_active_projects()
                    .filter(|p| p.external_partners.iter().any(|a| a.partner_id == partner.id))
                    .count();
                ui::render_partner_line(partner, placements);
            }
            Ok(())
        }
        PartnerCommands::Assign {
            project,
            partner,
            count,
            rep,
        } => {
            let params = AssignPartnerParameters {
                project,
                partner,
                member_count: count,
                representative_name: rep,
            };
            assign_partner(store, storage, params).map(|project| {
                println!(
                    "✓ Partner placed on {} ({})",
                    project.name,
                    ui::format_staffing(&project)
                )
            })
        }
        PartnerCommands::Unassign { project, partner } => {
            unassign_partner(store, storage, UnassignPartnerParameters { project, partner })
                .map(|project| println!("✓ Partner removed from {}", project.name))
        }
    };

    if let Err(error) = result {
        match &error {
            PartnerError::Lookup(e) => {
                let candidates = store.get_active_partners().map(|p| p.name.clone()).collect();
                fail_lookup(e, candidates)
            }
            _ => fail("Partner command failed", &error),
        }
    }
}
