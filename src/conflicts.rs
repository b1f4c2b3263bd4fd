//! Double-booking detection.
//!
//! A member is double-booked when two of their projects fall on the same day
//! and the work-time windows overlap. Detection is a pure function over
//! snapshots of the project and member lists.

use std::collections::HashMap;
use std::fmt;

use jiff::civil::Date;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    member::Member,
    project::Project,
    work_time::{TimeParseError, TimeWindow, WorkTimeError, parse_time},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    End,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Start => f.write_str("start"),
            TimeField::End => f.write_str("end"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("Project '{project}' has an invalid {field} time '{value}' (expected HH:MM)")]
    InvalidTime {
        project: String,
        field: TimeField,
        value: String,
    },

    #[error("Project '{project}' has an empty work time {start}-{end}")]
    EmptyWindow {
        project: String,
        start: String,
        end: String,
    },
}

/// Whether two `HH:MM` windows overlap on the same day
pub fn overlaps(start1: &str, end1: &str, start2: &str, end2: &str) -> Result<bool, TimeParseError> {
    let first = TimeWindow {
        start: parse_time(start1)?,
        end: parse_time(end1)?,
    };
    let second = TimeWindow {
        start: parse_time(start2)?,
        end: parse_time(end2)?,
    };
    Ok(first.overlaps(&second))
}

/// One member working one project, derived from `Project::assigned_members`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub member_id: Uuid,
    pub project_id: Uuid,
    pub date: Date,
    pub window: TimeWindow,
}

/// All overlapping projects of one member on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictAlert {
    pub member_id: Uuid,
    pub member_name: String,
    /// Project names in the order they were found
    pub conflicting_projects: Vec<String>,
    pub date: Date,
    /// One window per conflicting project, parallel to `conflicting_projects`
    pub windows: Vec<TimeWindow>,
    #[serde(skip)]
    project_ids: Vec<Uuid>,
}

impl ConflictAlert {
    fn new(member: &Member, date: Date) -> Self {
        Self {
            member_id: member.id,
            member_name: member.name.clone(),
            conflicting_projects: vec![],
            date,
            windows: vec![],
            project_ids: vec![],
        }
    }

    fn absorb(&mut self, project: &Project, window: TimeWindow) {
        if self.project_ids.contains(&project.id) {
            return;
        }
        self.project_ids.push(project.id);
        self.conflicting_projects.push(project.name.clone());
        self.windows.push(window);
    }

    /// Display string such as `09:00-12:00 / 11:00-14:00`
    pub fn time_range(&self) -> String {
        self.windows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    }

    pub fn involves_project(&self, project_name: &str) -> bool {
        self.conflicting_projects.iter().any(|p| p == project_name)
    }
}

fn project_window(project: &Project) -> Result<TimeWindow, ConflictError> {
    project.work_time.window().map_err(|e| match e {
        WorkTimeError::InvalidStart(e) => ConflictError::InvalidTime {
            project: project.name.clone(),
            field: TimeField::Start,
            value: e.value,
        },
        WorkTimeError::InvalidEnd(e) => ConflictError::InvalidTime {
            project: project.name.clone(),
            field: TimeField::End,
            value: e.value,
        },
        WorkTimeError::Empty { start, end } => ConflictError::EmptyWindow {
            project: project.name.clone(),
            start,
            end,
        },
    })
}

/// Member id to assignments, members in first-seen order
fn build_assignment_index(
    projects: &[Project],
) -> Result<Vec<(Uuid, Vec<Assignment>)>, ConflictError> {
    let mut positions: HashMap<Uuid, usize> = HashMap::new();
    let mut index: Vec<(Uuid, Vec<Assignment>)> = Vec::new();

    for project in projects.iter().filter(|p| !p.assigned_members.is_empty()) {
        let window = project_window(project)?;

        for &member_id in &project.assigned_members {
            let position = *positions.entry(member_id).or_insert_with(|| {
                index.push((member_id, Vec::new()));
                index.len() - 1
            });
            let assignments = &mut index[position].1;

            // Duplicate ids in one project count once
            if assignments.iter().any(|a| a.project_id == project.id) {
                continue;
            }

            assignments.push(Assignment {
                member_id,
                project_id: project.id,
                date: project.date,
                window,
            });
        }
    }

    Ok(index)
}

/// Dates in first-seen order
fn group_by_date(assignments: &[Assignment]) -> Vec<(Date, Vec<&Assignment>)> {
    let mut groups: Vec<(Date, Vec<&Assignment>)> = Vec::new();
    for assignment in assignments {
        match groups.iter_mut().find(|(date, _)| *date == assignment.date) {
            Some((_, group)) => group.push(assignment),
            None => groups.push((assignment.date, vec![assignment])),
        }
    }
    groups
}

/// Find every member booked on overlapping projects on the same day.
///
/// Callers pass only active projects and members. Member ids that are not in
/// `members` are ignored. Alerts come back in discovery order: members in
/// the order they first appear in `projects`, then their dates in the same
/// fashion.
pub fn detect_conflicts(
    projects: &[Project],
    members: &[Member],
) -> Result<Vec<ConflictAlert>, ConflictError> {
    let index = build_assignment_index(projects)?;
    let members_by_id: HashMap<Uuid, &Member> = members.iter().map(|m| (m.id, m)).collect();
    let projects_by_id: HashMap<Uuid, &Project> = projects.iter().map(|p| (p.id, p)).collect();

    let mut alerts = Vec::new();
    let mut comparisons = 0usize;

    for (member_id, assignments) in &index {
        if assignments.len() < 2 {
            continue;
        }
        let Some(member) = members_by_id.get(member_id) else {
            continue;
        };

        for (date, day) in group_by_date(assignments) {
            if day.len() < 2 {
                continue;
            }

            let mut alert: Option<ConflictAlert> = None;

            for (i, first) in day.iter().enumerate() {
                for second in &day[i + 1..] {
                    comparisons += 1;
                    if !first.window.overlaps(&second.window) {
                        continue;
                    }

                    let (Some(first_project), Some(second_project)) = (
                        projects_by_id.get(&first.project_id),
                        projects_by_id.get(&second.project_id),
                    ) else {
                        continue;
                    };

                    let alert = alert.get_or_insert_with(|| ConflictAlert::new(member, date));
                    alert.absorb(first_project, first.window);
                    alert.absorb(second_project, second.window);
                }
            }

            if let Some(alert) = alert {
                alerts.push(alert);
            }
        }
    }

    debug!(
        projects = projects.len(),
        members = index.len(),
        comparisons,
        conflicts = alerts.len(),
        "conflict detection finished"
    );

    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::work_time::WorkTime;

    fn member(name: &str) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: String::from(name),
            ..Member::default()
        }
    }

    fn project(name: &str, date: &str, start: &str, end: &str, members: &[&Member]) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: String::from(name),
            date: date.parse().unwrap(),
            work_time: WorkTime::new(start, end),
            assigned_members: members.iter().map(|m| m.id).collect(),
            ..Project::default()
        }
    }

    const TIMES: [&str; 7] = ["06:00", "08:30", "09:00", "11:00", "12:00", "14:00", "23:59"];

    #[test]
    fn test_overlap_is_symmetric() {
        for a in TIMES {
            for b in TIMES.iter().filter(|b| **b > a) {
                for c in TIMES {
                    for d in TIMES.iter().filter(|d| **d > c) {
                        assert_eq!(
                            overlaps(a, b, c, d).unwrap(),
                            overlaps(c, d, a, b).unwrap(),
                            "{a}-{b} vs {c}-{d}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        assert!(!overlaps("09:00", "12:00", "12:00", "14:00").unwrap());
        assert!(!overlaps("12:00", "14:00", "09:00", "12:00").unwrap());
    }

    #[test]
    fn test_containment_and_identity_overlap() {
        assert!(overlaps("08:00", "18:00", "10:00", "11:00").unwrap());
        assert!(overlaps("10:00", "11:00", "08:00", "18:00").unwrap());
        assert!(overlaps("09:00", "12:00", "09:00", "12:00").unwrap());
    }

    #[test]
    fn test_overlap_propagates_parse_errors() {
        let err = overlaps("09:00", "noon", "10:00", "11:00").unwrap_err();
        assert_eq!(err.value, "noon");
    }

    #[test]
    fn test_single_assignment_has_no_conflict() {
        let m = member("Yamada");
        let projects = vec![project("A", "2025-06-01", "09:00", "12:00", &[&m])];

        let alerts = detect_conflicts(&projects, &[m]).unwrap();

        assert!(alerts.is_empty());
    }

    #[test]
    fn test_overlapping_pair_yields_one_alert() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("B", "2025-06-01", "11:00", "14:00", &[&m]),
        ];

        let alerts = detect_conflicts(&projects, &[m.clone()]).unwrap();

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.member_id, m.id);
        assert_eq!(alert.member_name, "Yamada");
        assert_eq!(alert.conflicting_projects, vec!["A", "B"]);
        assert_eq!(alert.date.to_string(), "2025-06-01");
        assert_eq!(alert.time_range(), "09:00-12:00 / 11:00-14:00");
    }

    #[test]
    fn test_identical_windows_are_both_shown() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("B", "2025-06-01", "09:00", "12:00", &[&m]),
        ];

        let alerts = detect_conflicts(&projects, &[m]).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].conflicting_projects, vec!["A", "B"]);
        assert_eq!(alerts[0].time_range(), "09:00-12:00 / 09:00-12:00");
    }

    #[test]
    fn test_touching_windows_are_not_a_conflict() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("B", "2025-06-01", "12:00", "14:00", &[&m]),
        ];

        assert!(detect_conflicts(&projects, &[m]).unwrap().is_empty());
    }

    #[test]
    fn test_different_dates_are_isolated() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("C", "2025-06-02", "09:00", "12:00", &[&m]),
        ];

        assert!(detect_conflicts(&projects, &[m]).unwrap().is_empty());
    }

    #[test]
    fn test_three_way_overlap_merges_into_one_alert() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("B", "2025-06-01", "10:00", "13:00", &[&m]),
            project("C", "2025-06-01", "11:00", "14:00", &[&m]),
        ];

        let alerts = detect_conflicts(&projects, &[m]).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].conflicting_projects, vec!["A", "B", "C"]);
        assert_eq!(
            alerts[0].time_range(),
            "09:00-12:00 / 10:00-13:00 / 11:00-14:00"
        );
    }

    #[test]
    fn test_only_overlapping_projects_are_listed() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("B", "2025-06-01", "11:00", "13:00", &[&m]),
            project("Evening", "2025-06-01", "18:00", "20:00", &[&m]),
        ];

        let alerts = detect_conflicts(&projects, &[m]).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].conflicting_projects, vec!["A", "B"]);
        assert!(!alerts[0].involves_project("Evening"));
    }

    #[test]
    fn test_two_members_get_separate_alerts() {
        let sato = member("Sato");
        let tanaka = member("Tanaka");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&sato]),
            project("B", "2025-06-01", "10:00", "11:00", &[&sato]),
            project("C", "2025-06-01", "13:00", "17:00", &[&tanaka]),
            project("D", "2025-06-01", "16:00", "18:00", &[&tanaka]),
        ];

        let alerts = detect_conflicts(&projects, &[sato.clone(), tanaka.clone()]).unwrap();

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].member_id, sato.id);
        assert_eq!(alerts[0].conflicting_projects, vec!["A", "B"]);
        assert_eq!(alerts[1].member_id, tanaka.id);
        assert_eq!(alerts[1].conflicting_projects, vec!["C", "D"]);
    }

    #[test]
    fn test_one_alert_per_member_and_date() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("B", "2025-06-01", "11:00", "14:00", &[&m]),
            project("C", "2025-06-02", "09:00", "12:00", &[&m]),
            project("D", "2025-06-02", "09:30", "10:00", &[&m]),
        ];

        let alerts = detect_conflicts(&projects, &[m]).unwrap();

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].date.to_string(), "2025-06-01");
        assert_eq!(alerts[1].date.to_string(), "2025-06-02");
        assert_eq!(alerts[1].conflicting_projects, vec!["C", "D"]);
    }

    #[test]
    fn test_unknown_member_is_skipped() {
        let known = member("Known");
        let ghost = member("Ghost");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&ghost, &known]),
            project("B", "2025-06-01", "11:00", "14:00", &[&ghost]),
        ];

        let alerts = detect_conflicts(&projects, &[known]).unwrap();

        assert!(alerts.is_empty());
    }

    #[test]
    fn test_duplicate_ids_do_not_create_self_conflicts() {
        let m = member("Yamada");
        let mut a = project("A", "2025-06-01", "09:00", "12:00", &[&m]);
        a.assigned_members.push(m.id);

        let alerts = detect_conflicts(&[a], &[m]).unwrap();

        assert!(alerts.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_counted_once_in_a_real_conflict() {
        let m = member("Yamada");
        let mut a = project("A", "2025-06-01", "09:00", "12:00", &[&m]);
        a.assigned_members.push(m.id);
        let b = project("B", "2025-06-01", "10:00", "11:00", &[&m]);

        let alerts = detect_conflicts(&[a, b], &[m]).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].conflicting_projects, vec!["A", "B"]);
        assert_eq!(alerts[0].windows.len(), 2);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(detect_conflicts(&[], &[]).unwrap().is_empty());
        assert!(detect_conflicts(&[], &[member("Yamada")]).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_time_names_project_and_field() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("Broken", "2025-06-01", "9am", "12:00", &[&m]),
        ];

        let err = detect_conflicts(&projects, &[m]).unwrap_err();

        assert_eq!(
            err,
            ConflictError::InvalidTime {
                project: String::from("Broken"),
                field: TimeField::Start,
                value: String::from("9am"),
            }
        );
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let m = member("Yamada");
        let projects = vec![project("Night", "2025-06-01", "22:00", "02:00", &[&m])];

        let err = detect_conflicts(&projects, &[m]).unwrap_err();

        assert!(matches!(err, ConflictError::EmptyWindow { ref project, .. } if project == "Night"));
    }

    #[test]
    fn test_unstaffed_projects_are_not_parsed() {
        let m = member("Yamada");
        let projects = vec![project("Draft", "2025-06-01", "", "", &[])];

        assert!(detect_conflicts(&projects, &[m]).unwrap().is_empty());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let m = member("Yamada");
        let projects = vec![
            project("A", "2025-06-01", "09:00", "12:00", &[&m]),
            project("B", "2025-06-01", "11:00", "14:00", &[&m]),
        ];
        let members = vec![m];

        let first = detect_conflicts(&projects, &members).unwrap();
        let second = detect_conflicts(&projects, &members).unwrap();

        assert_eq!(first, second);
    }
}
