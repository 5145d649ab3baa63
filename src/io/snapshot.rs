//! Balance snapshot files
//!
//! A snapshot is a JSON object mapping account ids to integer balances:
//!
//! ```json
//! {
//!   "alice": 90,
//!   "bob": 10,
//!   "validator": 1
//! }
//! ```
//!
//! The initial snapshot is loaded once at start-up. After every settlement
//! round the scheduler saves a new file named
//! `accounts-<unix timestamp>-<round index>.json`.

use crate::types::{Balances, LedgerError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load the initial balance table
///
/// The validator account is added with a zero balance if the file lacks it.
pub async fn load_snapshot(path: &Path) -> Result<Balances, LedgerError> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        LedgerError::persistence(format!(
            "failed to read snapshot {}: {e}",
            path.display()
        ))
    })?;

    let accounts: HashMap<String, i64> = serde_json::from_slice(&data).map_err(|e| {
        LedgerError::persistence(format!(
            "failed to parse snapshot {}: {e}",
            path.display()
        ))
    })?;

    Ok(Balances::with_validator(accounts))
}

/// File name for the snapshot saved after `round_index` at `timestamp`
pub fn snapshot_file_name(timestamp: i64, round_index: u64) -> String {
    format!("accounts-{timestamp}-{round_index}.json")
}

/// Destination for balance snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist `balances` as of `timestamp` after round `round_index`
    ///
    /// # Returns
    ///
    /// Where the snapshot was written.
    async fn save(
        &self,
        balances: &Balances,
        timestamp: i64,
        round_index: u64,
    ) -> Result<PathBuf, LedgerError>;
}

/// Writes pretty-printed snapshot files into a directory
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Store snapshots under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory snapshots are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(
        &self,
        balances: &Balances,
        timestamp: i64,
        round_index: u64,
    ) -> Result<PathBuf, LedgerError> {
        let path = self.dir.join(snapshot_file_name(timestamp, round_index));

        let data = serde_json::to_vec_pretty(&balances.sorted()).map_err(|e| {
            LedgerError::persistence(format!("failed to encode snapshot: {e}"))
        })?;

        tokio::fs::write(&path, data).await.map_err(|e| {
            LedgerError::persistence(format!(
                "failed to write snapshot file {}: {e}",
                path.display()
            ))
        })?;

        debug!(path = %path.display(), accounts = balances.len(), "Snapshot saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VALIDATOR_ACCOUNT;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// Helper function to create a temporary snapshot file for testing
    fn create_temp_snapshot(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[tokio::test]
    async fn test_load_adds_validator_account() {
        let file = create_temp_snapshot(r#"{"alice": 100, "bob": -3}"#);

        let balances = load_snapshot(file.path()).await.unwrap();

        assert_eq!(balances.get("alice"), Some(100));
        assert_eq!(balances.get("bob"), Some(-3));
        assert_eq!(balances.get(VALIDATOR_ACCOUNT), Some(0));
    }

    #[tokio::test]
    async fn test_load_keeps_existing_validator_balance() {
        let file = create_temp_snapshot(r#"{"validator": 12}"#);

        let balances = load_snapshot(file.path()).await.unwrap();

        assert_eq!(balances.get(VALIDATOR_ACCOUNT), Some(12));
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let result = load_snapshot(Path::new("does-not-exist.json")).await;

        let err = result.unwrap_err();
        assert!(matches!(err, LedgerError::Persistence { .. }));
        assert!(err.to_string().contains("failed to read snapshot"), "{err}");
    }

    #[tokio::test]
    async fn test_load_rejects_non_integer_balances() {
        let file = create_temp_snapshot(r#"{"alice": "lots"}"#);

        let err = load_snapshot(file.path()).await.unwrap_err();

        assert!(err.to_string().contains("failed to parse snapshot"), "{err}");
    }

    #[test]
    fn test_snapshot_file_name() {
        assert_eq!(snapshot_file_name(1700000000, 7), "accounts-1700000000-7.json");
    }

    #[tokio::test]
    async fn test_save_writes_sorted_pretty_json() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        let balances = Balances::from([("validator", 1), ("bob", 2), ("alice", 3)]);

        let path = store.save(&balances, 42, 3).await.unwrap();

        assert_eq!(path, dir.path().join("accounts-42-3.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"alice\": 3,\n  \"bob\": 2,\n  \"validator\": 1\n}"
        );
    }

    #[tokio::test]
    async fn test_saved_snapshot_loads_back() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        let balances = Balances::from([("validator", 5), ("alice", -1)]);

        let path = store.save(&balances, 1, 1).await.unwrap();

        assert_eq!(load_snapshot(&path).await.unwrap(), balances);
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("missing"));

        let result = store.save(&Balances::new(), 1, 1).await;

        assert!(matches!(result, Err(LedgerError::Persistence { .. })));
    }
}
