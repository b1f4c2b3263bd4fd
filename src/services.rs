use thiserror::Error;

pub mod assignments;
pub mod members;
pub mod partners;
pub mod projects;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("{kind} '{query}' not found")]
    NotFound { kind: &'static str, query: String },

    #[error("{kind} name is ambiguous. Multiple matches found: {}", .names.join(", "))]
    Ambiguous {
        kind: &'static str,
        names: Vec<String>,
    },
}

/// Resolve a user-typed name against `candidates`.
///
/// A case-insensitive exact match wins; otherwise the query must be a
/// substring of exactly one candidate name.
pub fn find_by_name<'a, T: 'a>(
    candidates: impl IntoIterator<Item = &'a T>,
    query: &str,
    kind: &'static str,
    name_of: impl Fn(&T) -> &str,
) -> Result<&'a T, LookupError> {
    let needle = query.to_lowercase();
    let matching: Vec<&T> = candidates
        .into_iter()
        .filter(|c| name_of(c).to_lowercase().contains(&needle))
        .collect();

    if let Some(exact) = matching
        .iter()
        .find(|c| name_of(c).to_lowercase() == needle)
    {
        return Ok(*exact);
    }

    match matching.len() {
        0 => Err(LookupError::NotFound {
            kind,
            query: query.to_string(),
        }),
        1 => Ok(matching[0]),
        _ => Err(LookupError::Ambiguous {
            kind,
            names: matching.iter().map(|c| name_of(c).to_string()).collect(),
        }),
    }
}

/// Merge an optional notes edit: `None` keeps `current`, a blank value clears it
pub fn merge_notes(update: Option<String>, current: Option<String>) -> Option<String> {
    match update {
        None => current,
        Some(notes) if notes.trim().is_empty() => None,
        Some(notes) => Some(notes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(names: &'a [&'a str], query: &str) -> Result<&'a &'a str, LookupError> {
        find_by_name(names, query, "Member", |n| *n)
    }

    #[test]
    fn test_substring_match() {
        let names = ["Yamada Taro", "Sato Hanako"];
        assert_eq!(find(&names, "sato").unwrap(), &"Sato Hanako");
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let names = ["Sato", "Sato Hanako"];
        assert_eq!(find(&names, "sato").unwrap(), &"Sato");
    }

    #[test]
    fn test_not_found_and_ambiguous() {
        let names = ["Sato Hanako", "Sato Ichiro"];
        assert!(matches!(
            find(&names, "Tanaka"),
            Err(LookupError::NotFound { .. })
        ));
        assert_eq!(
            find(&names, "sato"),
            Err(LookupError::Ambiguous {
                kind: "Member",
                names: vec![String::from("Sato Hanako"), String::from("Sato Ichiro")],
            })
        );
    }

    #[test]
    fn test_merge_notes() {
        let current = Some(String::from("bring ladder"));

        assert_eq!(merge_notes(None, current.clone()), current);
        assert_eq!(merge_notes(Some(String::from("  ")), current.clone()), None);
        assert_eq!(
            merge_notes(Some(String::from("gate code 1234")), current),
            Some(String::from("gate code 1234"))
        );
    }
}
