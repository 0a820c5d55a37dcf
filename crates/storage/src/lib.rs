use directories::ProjectDirs;
use markup_model::{EditorSettings, SettingsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: u32 = 1;
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("settings file has schema version {found}, this build reads up to {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("stored settings are invalid: {0}")]
    Invalid(#[from] SettingsError),
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsEnvelope {
    version: u32,
    settings: EditorSettings,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "PdfMarkup", "pdf-markup")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Stored settings, or the defaults when nothing has been saved yet.
    pub fn load_settings(&self) -> Result<EditorSettings, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no stored settings, using defaults");
            return Ok(EditorSettings::default());
        }

        let bytes = fs::read(&path)?;
        let envelope: SettingsEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version > SETTINGS_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: envelope.version,
                supported: SETTINGS_SCHEMA_VERSION,
            });
        }
        envelope.settings.validate()?;

        Ok(envelope.settings)
    }

    pub fn save_settings(&self, settings: &EditorSettings) -> Result<(), StorageError> {
        settings.validate()?;
        fs::create_dir_all(&self.root)?;

        let envelope =
            SettingsEnvelope { version: SETTINGS_SCHEMA_VERSION, settings: settings.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.settings_path(), bytes)?;
        tracing::debug!(path = %self.settings_path().display(), "saved settings");
        Ok(())
    }
}
