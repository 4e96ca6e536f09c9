use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SERVICE: &str = "https://bsky.social";

#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    pub username: String,
    pub password: String,
    /// Pause between two polling cycles, in milliseconds.
    pub sleep_timeout: u64,
    #[serde(default = "default_service")]
    pub service: String,
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_string()
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sleep_timeout", &self.sleep_timeout)
            .field("service", &self.service)
            .finish()
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bsky-follow-back").join("config.toml"))
    }

    /// Loads settings from `path`, or from the default config location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path().context("Could not determine config directory")?,
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;

        tracing::info!(?path, username = %settings.username, "Loaded config");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            anyhow::bail!("username must not be empty");
        }
        if self.password.is_empty() {
            anyhow::bail!("password must not be empty");
        }
        if self.sleep_timeout == 0 {
            anyhow::bail!("sleep_timeout must be greater than 0 milliseconds");
        }
        reqwest::Url::parse(&self.service)
            .with_context(|| format!("service is not a valid URL: {}", self.service))?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_timeout)
    }
}
