use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.trakt.tv";

/// Settings value object. Loaded and saved as a whole; callers hold an
/// immutable copy for the duration of a sync pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub trakt: TraktConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraktConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    #[serde(default = "default_true")]
    pub sync_movies: bool,
    #[serde(default = "default_true")]
    pub sync_series: bool,
    /// Snapshot of the host media library used by the command line host
    #[serde(default)]
    pub library_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            api_url: default_api_url(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            sync_movies: default_true(),
            sync_series: default_true(),
            library_file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config, falling back to defaults when the file does not exist yet.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("toml.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.is_trakt_configured() {
            return Err(anyhow::anyhow!("Trakt client_id is not configured"));
        }
        if !self.trakt.api_url.starts_with("http://") && !self.trakt.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!("Invalid Trakt api_url: {}", self.trakt.api_url));
        }
        if !self.sync.sync_movies && !self.sync.sync_series {
            return Err(anyhow::anyhow!("Both sync_movies and sync_series are disabled"));
        }
        Ok(())
    }

    pub fn is_trakt_configured(&self) -> bool {
        !self.trakt.client_id.is_empty() && self.trakt.client_id != "YOUR_CLIENT_ID"
    }
}
