//! Rotation cursor persistence.
//!
//! The batch loop round-robins through the background and overlay pools;
//! the two indices survive across runs in a small JSON file. The persisted
//! values are always post-modulo, so a later run against a smaller pool
//! simply wraps instead of indexing out of range.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Round-robin positions in the background and overlay pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationCursor {
    /// Next background pool index (pre-modulo use: `index % pool_len`).
    #[serde(default)]
    pub background_index: u64,
    /// Next overlay-element pool index.
    #[serde(default)]
    pub element_index: u64,
}

impl RotationCursor {
    /// Create a cursor at explicit positions.
    pub fn new(background_index: u64, element_index: u64) -> Self {
        Self {
            background_index,
            element_index,
        }
    }
}

/// File-backed store for the [`RotationCursor`].
///
/// The cursor is read once at batch start and overwritten wholesale on a
/// clean loop finish. A mid-batch failure never touches the file, so the
/// cursor stays at its pre-batch value.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted cursor.
    ///
    /// A missing file yields the default `{0, 0}` cursor. A file that
    /// exists but fails to parse is a [`CoreError::State`] error rather
    /// than a silent reset, so rotation state is never quietly lost.
    pub fn load(&self) -> Result<RotationCursor, CoreError> {
        if !self.path.exists() {
            return Ok(RotationCursor::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            CoreError::State(format!(
                "Corrupt cursor file at {}: {e}",
                self.path.display()
            ))
        })
    }

    /// Persist the cursor, replacing any previous value.
    ///
    /// Writes to a sibling temp file and renames it into place so a crash
    /// mid-write cannot leave a truncated cursor file behind.
    pub fn save(&self, cursor: &RotationCursor) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(cursor)
            .map_err(|e| CoreError::State(format!("Failed to encode cursor: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            background_index = cursor.background_index,
            element_index = cursor.element_index,
            path = %self.path.display(),
            "Saved rotation cursor",
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CursorStore {
        CursorStore::new(dir.path().join("image_indices.json"))
    }

    #[test]
    fn missing_file_defaults_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().unwrap(), RotationCursor::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let cursor = RotationCursor::new(3, 7);
        store.save(&cursor).unwrap();
        assert_eq!(store.load().unwrap(), cursor);
    }

    #[test]
    fn save_of_loaded_cursor_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&RotationCursor::new(1, 2)).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn overwrites_previous_value_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&RotationCursor::new(5, 5)).unwrap();
        store.save(&RotationCursor::new(0, 1)).unwrap();
        assert_eq!(store.load().unwrap(), RotationCursor::new(0, 1));
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(CoreError::State(_))));
    }

    #[test]
    fn missing_fields_default_individually() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"background_index": 4}"#).unwrap();
        assert_eq!(store.load().unwrap(), RotationCursor::new(4, 0));
    }
}
