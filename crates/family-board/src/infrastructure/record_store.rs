//! JSON record persistence for the board configuration.
//!
//! The store addresses a single record by a fixed key and format version and
//! keeps it in one file, `<storage-dir>/<key>`, wrapped in a small envelope:
//!
//! ```json
//! {
//!   "version": 1,
//!   "key": "family_board.config",
//!   "data": { "...": "the opaque configuration mapping" }
//! }
//! ```
//!
//! The envelope lets a future version of the service recognise records written
//! by an older format before deciding what to do with them; today an
//! unexpected version is an error (no migration is performed).
//!
//! # Atomicity
//!
//! `save` never writes the target file in place.  It writes the full envelope
//! to a uniquely named sibling temp file and then renames it over the target.
//! On the platforms we support, the rename is atomic, so a reader (or a crash
//! mid-save) observes either the old complete record or the new complete
//! record — never a torn file.  Two concurrent saves race and the last rename
//! wins, which is exactly the last-write-wins contract of the config commands.
//!
//! # Absence
//!
//! A record that was never saved is reported as `Ok(None)`, not as an error
//! and not as an empty mapping.  Callers decide what absence means.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Error type for record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The platform storage directory could not be determined.
    #[error("could not determine platform storage directory")]
    NoPlatformStorageDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing record at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record envelope could not be read or written as JSON.
    #[error("record JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The stored envelope belongs to a different record.
    #[error("stored record has key '{found}', expected '{expected}'")]
    KeyMismatch { expected: String, found: String },

    /// The stored envelope was written by an unsupported format version.
    #[error("stored record has version {found}, this service supports version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

// ── On-disk envelope ──────────────────────────────────────────────────────────

/// The JSON document actually written to disk.
#[derive(Debug, Serialize, Deserialize)]
struct RecordEnvelope {
    version: u32,
    key: String,
    data: Value,
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Key/version-addressed persistence for one JSON record.
///
/// The store is stateless between calls: it holds the record's identity and
/// location, never a copy of the data.  Wrap it in an `Arc` and share it
/// across handlers.
#[derive(Debug)]
pub struct RecordStore {
    dir: PathBuf,
    key: String,
    version: u32,
}

impl RecordStore {
    /// Creates a store for the record `key` at format `version`, kept under
    /// `dir`.  Nothing is touched on disk until the first `load` or `save`.
    pub fn new(dir: PathBuf, key: &str, version: u32) -> Self {
        Self {
            dir,
            key: key.to_string(),
            version,
        }
    }

    /// Full path of the record file.
    pub fn record_path(&self) -> PathBuf {
        self.dir.join(&self.key)
    }

    /// Loads the record's data mapping from disk.
    ///
    /// Returns `Ok(None)` when the record was never saved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for file-system errors other than "not
    /// found", [`StoreError::Parse`] for malformed JSON, and
    /// [`StoreError::KeyMismatch`] / [`StoreError::UnsupportedVersion`] when
    /// the envelope does not match this store's identity.
    pub async fn load(&self) -> Result<Option<Value>, StoreError> {
        let path = self.record_path();

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("record '{}' not found at {path:?} (never saved)", self.key);
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let envelope: RecordEnvelope = serde_json::from_str(&content)?;

        if envelope.key != self.key {
            return Err(StoreError::KeyMismatch {
                expected: self.key.clone(),
                found: envelope.key,
            });
        }
        if envelope.version != self.version {
            return Err(StoreError::UnsupportedVersion {
                found: envelope.version,
                supported: self.version,
            });
        }

        Ok(Some(envelope.data))
    }

    /// Persists `data` as the record's new value, fully replacing the
    /// previous one.
    ///
    /// Creates the storage directory if it does not exist.  The write goes
    /// through a uniquely named temp file and an atomic rename.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for file-system failures or
    /// [`StoreError::Parse`] if the envelope cannot be serialized.
    pub async fn save(&self, data: &Value) -> Result<(), StoreError> {
        let path = self.record_path();

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let envelope = RecordEnvelope {
            version: self.version,
            key: self.key.clone(),
            data: data.clone(),
        };
        let content = serde_json::to_string_pretty(&envelope)?;

        // Unique temp name so concurrent saves never interleave writes into
        // the same temp file; each rename installs one complete envelope.
        let tmp_path = self.dir.join(format!(".{}.{}.tmp", self.key, Uuid::new_v4()));

        tokio::fs::write(&tmp_path, &content)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        debug!("record '{}' saved to {path:?}", self.key);
        Ok(())
    }
}

// ── Platform storage directory ────────────────────────────────────────────────

/// Resolves the platform-appropriate storage directory:
///
/// - Windows:  `%APPDATA%\FamilyBoard`
/// - Linux:    `$XDG_CONFIG_HOME/family-board` or `~/.config/family-board`
/// - macOS:    `~/Library/Application Support/FamilyBoard`
pub fn platform_storage_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("FamilyBoard"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("family-board"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/FamilyBoard
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("FamilyBoard")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        // Fallback for unsupported platforms.
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A store rooted in a fresh temp directory.  Callers clean up with
    /// `remove_dir_all` at the end of the test.
    fn temp_store() -> RecordStore {
        let dir = std::env::temp_dir().join(format!("family_board_store_{}", Uuid::new_v4()));
        RecordStore::new(dir, "family_board.config", 1)
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_load_returns_none_when_never_saved() {
        // Arrange
        let store = temp_store();

        // Act
        let loaded = store.load().await.expect("load");

        // Assert: absence, not an error and not an empty mapping
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_data() {
        // Arrange
        let store = temp_store();
        let data = json!({"lists": {"shopping": ["milk"]}, "columns": 4});

        // Act
        store.save(&data).await.expect("save");
        let loaded = store.load().await.expect("load");

        // Assert
        assert_eq!(loaded, Some(data));

        std::fs::remove_dir_all(store.record_path().parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_value() {
        let store = temp_store();

        store.save(&json!({"a": 1})).await.expect("first save");
        store.save(&json!({"b": 2})).await.expect("second save");
        let loaded = store.load().await.expect("load");

        // Full replacement: no trace of the first value.
        assert_eq!(loaded, Some(json!({"b": 2})));

        std::fs::remove_dir_all(store.record_path().parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files_behind() {
        let store = temp_store();

        store.save(&json!({"a": 1})).await.expect("save");

        let dir = store.record_path().parent().unwrap().to_path_buf();
        let entries: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();

        // Only the record file itself remains after the rename.
        assert_eq!(entries, vec!["family_board.config"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_on_disk_format_is_a_versioned_envelope() {
        // Arrange
        let store = temp_store();
        store.save(&json!({"theme": "dark"})).await.expect("save");

        // Act: read the raw file, bypassing the store
        let raw = std::fs::read_to_string(store.record_path()).unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();

        // Assert
        assert_eq!(doc["version"], json!(1));
        assert_eq!(doc["key"], json!("family_board.config"));
        assert_eq!(doc["data"], json!({"theme": "dark"}));

        std::fs::remove_dir_all(store.record_path().parent().unwrap()).ok();
    }

    // ── error paths ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_load_corrupt_file_returns_parse_error() {
        // Arrange: write garbage where the record should be
        let store = temp_store();
        let dir = store.record_path().parent().unwrap().to_path_buf();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(store.record_path(), "{{{ not json").unwrap();

        // Act
        let result = store.load().await;

        // Assert
        assert!(matches!(result, Err(StoreError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_load_wrong_key_returns_key_mismatch() {
        let store = temp_store();
        let dir = store.record_path().parent().unwrap().to_path_buf();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            store.record_path(),
            r#"{"version":1,"key":"somebody_else.config","data":{}}"#,
        )
        .unwrap();

        let result = store.load().await;

        assert!(matches!(result, Err(StoreError::KeyMismatch { .. })));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_load_newer_version_returns_unsupported_version() {
        let store = temp_store();
        let dir = store.record_path().parent().unwrap().to_path_buf();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            store.record_path(),
            r#"{"version":2,"key":"family_board.config","data":{}}"#,
        )
        .unwrap();

        let result = store.load().await;

        // No migration: a newer (or older) format version is a hard error.
        match result {
            Err(StoreError::UnsupportedVersion { found, supported }) => {
                assert_eq!(found, 2);
                assert_eq!(supported, 1);
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    // ── platform directory ────────────────────────────────────────────────────

    #[test]
    fn test_platform_storage_dir_returns_some_on_this_platform() {
        // This test verifies the function returns Some on the current platform.
        // It may fail if the environment variable is unset in a stripped container.
        let result = platform_storage_dir();
        #[cfg(target_os = "windows")]
        if std::env::var_os("APPDATA").is_some() {
            assert!(result.is_some());
        }
        #[cfg(target_os = "linux")]
        {
            let has_xdg = std::env::var_os("XDG_CONFIG_HOME").is_some();
            let has_home = std::env::var_os("HOME").is_some();
            if has_xdg || has_home {
                assert!(result.is_some());
            }
        }
        #[cfg(target_os = "macos")]
        if std::env::var_os("HOME").is_some() {
            assert!(result.is_some());
        }
    }

    #[test]
    fn test_record_path_joins_dir_and_key() {
        let store = RecordStore::new(PathBuf::from("/srv/board"), "family_board.config", 1);
        assert_eq!(
            store.record_path(),
            PathBuf::from("/srv/board/family_board.config")
        );
    }
}
