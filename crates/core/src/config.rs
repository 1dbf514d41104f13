//! Per-installation configuration.
//!
//! A small `config.json` lives in the app data directory alongside the
//! rotation-cursor file. It is read once at process start; a missing file
//! or missing field is startup-fatal.
//!
//! | Field             | Meaning                                        |
//! |-------------------|------------------------------------------------|
//! | `drive_folder_id` | Root cloud-drive folder for this installation. |
//! | `upload_preset`   | Unsigned upload preset name on the image host. |

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CoreError;

/// Directory name under the platform data dir holding config and state.
pub const APP_DIR_NAME: &str = "capforge";

/// Filename of the per-installation config record.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Filename of the rotation-cursor state file.
pub const CURSOR_FILE_NAME: &str = "image_indices.json";

/// Per-installation configuration record.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Cloud-drive root folder identifier.
    pub drive_folder_id: String,
    /// Image-host unsigned upload preset name.
    pub upload_preset: String,
}

impl AppConfig {
    /// Resolve the per-installation data directory.
    pub fn data_dir() -> Result<PathBuf, CoreError> {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or_else(|| CoreError::Config("No platform data directory available".into()))
    }

    /// Load and validate the config record from an explicit path.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Cannot read config at {}: {e}", path.display()))
        })?;
        let config: AppConfig = serde_json::from_str(&raw).map_err(|e| {
            CoreError::Config(format!("Invalid config at {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location (`{data_dir}/capforge/config.json`).
    pub fn load_default() -> Result<Self, CoreError> {
        let path = Self::data_dir()?.join(CONFIG_FILE_NAME);
        Self::load(&path)
    }

    /// Both fields are required and must be non-empty.
    fn validate(&self) -> Result<(), CoreError> {
        if self.drive_folder_id.trim().is_empty() {
            return Err(CoreError::Config("drive_folder_id must not be empty".into()));
        }
        if self.upload_preset.trim().is_empty() {
            return Err(CoreError::Config("upload_preset must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{"drive_folder_id": "folder-1", "upload_preset": "unsigned_x"}"#,
        );
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.drive_folder_id, "folder-1");
        assert_eq!(config.upload_preset, "unsigned_x");
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn missing_field_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{"drive_folder_id": "folder-1"}"#);
        assert!(matches!(AppConfig::load(&path), Err(CoreError::Config(_))));
    }

    #[test]
    fn empty_field_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{"drive_folder_id": "", "upload_preset": "unsigned_x"}"#,
        );
        assert!(matches!(AppConfig::load(&path), Err(CoreError::Config(_))));
    }
}
