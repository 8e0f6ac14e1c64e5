use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Client settings, read from `config.toml` in the platform config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the analysis service, including the API prefix.
    pub api_url: String,
    /// Where the upload record and document previews are kept.
    pub state_dir: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: default_state_dir(),
            request_timeout_secs: 120,
            log_level: "info".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("ai", "finsights", "finsights")
}

fn default_state_dir() -> String {
    project_dirs()
        .map(|dirs| dirs.data_dir().display().to_string())
        .unwrap_or_else(|| "~/.finsights".to_string())
}

/// `config.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load from `path` (or the default location), fall back to defaults if
    /// the file does not exist, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Invalid config")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("FINSIGHTS_API_URL") {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(dir) = std::env::var("FINSIGHTS_STATE_DIR") {
            if !dir.trim().is_empty() {
                self.state_dir = dir;
            }
        }
    }

    /// State directory with `~` expanded.
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state_dir).to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml("api_url = \"http://analysis:8000/api/v1\"\n").unwrap();
        assert_eq!(config.api_url, "http://analysis:8000/api/v1");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn state_path_and_timeout() {
        let config = Config {
            state_dir: "/var/lib/finsights".into(),
            ..Config::default()
        };
        assert_eq!(config.state_path(), PathBuf::from("/var/lib/finsights"));
        assert_eq!(
            Config {
                request_timeout_secs: 0,
                ..Config::default()
            }
            .request_timeout(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.request_timeout_secs, Config::default().request_timeout_secs);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(Config::from_toml("api_url = ").is_err());
    }
}
