//! Store schema upgrades. Version 1 is the first schema, so no upgrade steps
//! exist yet; a step is added here whenever `CURRENT_VERSION` is bumped.

use serde_json::Value;
use tracing::info;

use crate::storage::StorageError;

/// Rewrites a store document from schema `n` to `n + 1`
type Upgrade = fn(Value) -> Result<Value, StorageError>;

/// `(from_version, upgrade)` pairs
const UPGRADES: &[(u32, Upgrade)] = &[];

/// Files written before versioning carry no `version` field and are v1
pub fn detect_version(data: &Value) -> Result<u32, StorageError> {
    let Some(raw) = data.get("version") else {
        return Ok(1);
    };
    raw.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| StorageError::BadVersion(raw.to_string()))
}

pub fn apply_migrations(data: Value, from: u32, to: u32) -> Result<Value, StorageError> {
    if from > to {
        return Err(StorageError::TooNew {
            found: from,
            supported: to,
        });
    }

    (from..to).try_fold(data, |data, version| {
        let (_, upgrade) = UPGRADES
            .iter()
            .find(|(v, _)| *v == version)
            .ok_or(StorageError::NoMigration(version))?;
        let upgraded = upgrade(data)?;
        info!(from = version, to = version + 1, "store schema upgraded");
        Ok(upgraded)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_version() {
        assert_eq!(detect_version(&json!({"version": 3, "members": []})).unwrap(), 3);
        assert_eq!(detect_version(&json!({"members": [], "projects": []})).unwrap(), 1);
    }

    #[test]
    fn test_detect_version_rejects_non_numbers() {
        for bad in [json!({"version": "one"}), json!({"version": -1}), json!({"version": 1.5})] {
            assert!(matches!(detect_version(&bad), Err(StorageError::BadVersion(_))));
        }
    }

    #[test]
    fn test_no_op_when_already_current() {
        let data = json!({"version": 1, "members": []});
        assert_eq!(apply_migrations(data.clone(), 1, 1).unwrap(), data);
    }

    #[test]
    fn test_missing_upgrade_step() {
        let result = apply_migrations(json!({}), 1, 2);
        assert!(matches!(result, Err(StorageError::NoMigration(1))));
    }

    #[test]
    fn test_downgrade_is_refused() {
        let result = apply_migrations(json!({"version": 5}), 5, 1);
        assert!(matches!(
            result,
            Err(StorageError::TooNew {
                found: 5,
                supported: 1
            })
        ));
    }
}
