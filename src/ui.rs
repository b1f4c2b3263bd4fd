use colored::*;
use jiff::civil::Date;

use crate::{
    conflicts::ConflictAlert,
    models::{member::Member, partner::ExternalPartner, project::Project, store::Store},
    schedule::Schedule,
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Print `left` with `right` pushed to the terminal's right edge when it fits.
/// `left_visible_len` is the length of `left` without ANSI codes.
fn print_with_right_context(left: ColoredString, left_visible_len: usize, right: &str) {
    if right.is_empty() {
        println!("{}", left);
        return;
    }

    let terminal_width = get_terminal_width();
    let total_content = left_visible_len + right.chars().count();

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", left, " ".repeat(padding), right.dimmed());
    } else {
        println!("{}  {}", left, right.dimmed());
    }
}

pub fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize, singular: &str, plural_noun: &str) {
    println!(
        "\n  {} ({} {})\n",
        title.cyan().bold(),
        count,
        plural(count, singular, plural_noun)
    );
}

/// Render a section header (e.g., a project name on the board)
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Status glyph for a project or member: red dot when double-booked
pub fn get_status_glyph(has_conflict: bool) -> ColoredString {
    if has_conflict { "●".red() } else { "○".normal() }
}

/// Staffing summary such as `3/4 staffed`
pub fn format_staffing(project: &Project) -> String {
    format!("{}/{} staffed", project.staffed_count(), project.required_members)
}

/// One project line: window, glyph, name, and location/staffing on the right
pub fn render_project_line(project: &Project, schedule: &Schedule) {
    let has_conflict = schedule.project_has_conflict(project);
    let window = project.work_time.to_string();
    let left_plain = format!("  {}  {}  {}", window, " ", project.name);

    let left = format!(
        "  {}  {}  {}",
        window.dimmed(),
        get_status_glyph(has_conflict),
        project.name
    );
    let styled_left = if has_conflict { left.red().bold() } else { left.bold() };

    let mut right = vec![];
    if !project.location.is_empty() {
        right.push(project.location.clone());
    }
    right.push(format_staffing(project));

    print_with_right_context(styled_left, left_plain.chars().count(), &right.join("  ·  "));
}

/// Whether the project's window falls outside the member's available hours
fn outside_available_hours(member: &Member, project: &Project) -> bool {
    match (member.available_hours.window(), project.work_time.window()) {
        (Ok(available), Ok(work)) => !available.contains(&work),
        _ => false,
    }
}

/// One member line inside a project block
pub fn render_member_line(member: &Member, has_conflict: bool, is_lead: bool, outside_hours: bool) {
    let lead_marker = if is_lead { "★" } else { " " };
    let left_plain = format!("      {} {}  {}", lead_marker, " ", member.name);

    let left = format!(
        "      {} {}  {}",
        lead_marker.yellow(),
        get_status_glyph(has_conflict),
        member.name
    );
    let styled_left = if has_conflict { left.red() } else { left.normal() };

    let right = if outside_hours {
        format!("{}  outside {}", member.team, member.available_hours)
            .trim_start()
            .to_string()
    } else {
        member.team.clone()
    };
    print_with_right_context(styled_left, left_plain.chars().count(), &right);
}

/// Project block for the board: header line, members, partners
pub fn render_project_block(project: &Project, schedule: &Schedule, store: &Store) {
    render_project_line(project, schedule);

    let mut any = false;
    for member in schedule.assigned_members(project) {
        any = true;
        render_member_line(
            member,
            schedule.member_has_conflict_on(member.id, project.date),
            project.lead_member_id == Some(member.id),
            outside_available_hours(member, project),
        );
    }
    for placement in &project.external_partners {
        any = true;
        let partner_name = store
            .get_partner(placement.partner_id)
            .map(|p| p.name.as_str())
            .unwrap_or("(unknown partner)");
        println!(
            "      {}  {} × {} {}",
            "◇".blue(),
            placement.member_count,
            partner_name,
            format!("(rep. {})", placement.representative_name).dimmed()
        );
    }
    if !any {
        println!("      {}", "nobody assigned".dimmed());
    }
    println!();
}

/// Warning banner for one double-booking
pub fn render_conflict_banner(alert: &ConflictAlert) {
    println!(
        "  {} {} is double-booked on {} ({})",
        "⚠".red().bold(),
        alert.member_name.bold(),
        alert.date,
        alert.time_range()
    );
    println!(
        "    {} {}",
        "Overlapping projects:".dimmed(),
        alert.conflicting_projects.join(", ")
    );
}

pub fn render_conflict_banners<'a>(alerts: impl IntoIterator<Item = &'a ConflictAlert>) {
    let alerts: Vec<_> = alerts.into_iter().collect();
    if alerts.is_empty() {
        return;
    }
    println!();
    for alert in alerts {
        render_conflict_banner(alert);
    }
}

/// Member listing line with team and hours on the right
pub fn render_member_summary(member: &Member, has_conflict: bool) {
    let left_plain = format!("  {}  {}", " ", member.name);
    let left = format!("  {}  {}", get_status_glyph(has_conflict), member.name);
    let styled_left = if member.is_active() { left.bold() } else { left.dimmed() };

    let right = if member.team.is_empty() {
        member.available_hours.to_string()
    } else {
        format!("{}  ·  {}", member.team, member.available_hours)
    };

    print_with_right_context(styled_left, left_plain.chars().count(), &right);
}

pub fn render_partner_line(partner: &ExternalPartner, placements: usize) {
    let left = format!("  {} {}", "•".green(), partner.name);
    let left_plain = format!("  • {}", partner.name);
    let styled_left = if partner.is_active() { left.bold() } else { left.dimmed() };

    let right = format!("{} {}", placements, plural(placements, "project", "projects"));
    print_with_right_context(styled_left, left_plain.chars().count(), &right);
}

/// Format a date as a human-readable header (e.g., "Tomorrow", "Monday, Feb 17")
pub fn format_date_header(date: Date) -> String {
    let today = jiff::Zoned::now().date();

    if date == today {
        format!("Today ({})", date.strftime("%b %d"))
    } else if today.tomorrow().is_ok_and(|tomorrow| tomorrow == date) {
        format!("Tomorrow ({})", date.strftime("%b %d"))
    } else {
        date.strftime("%A, %b %d %Y").to_string()
    }
}
