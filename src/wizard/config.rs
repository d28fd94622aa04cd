use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::error::Result;

const CONFIG_DIR: &str = "sgee";
const CONFIG_FILE: &str = "enroll.toml";

/// `$XDG_CONFIG_HOME/sgee/enroll.toml`, if a config directory is known
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub general: GeneralConfig,
    pub api: ApiConfig,
    pub candidate: CandidateConfig,
}

impl WizardConfig {
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: WizardConfig = toml::from_str(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub title: String,
    pub subtitle: String,
    /// Use the built-in demo backend; nothing is sent anywhere
    pub dryrun: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: "SGEE Enrollment".to_string(),
            subtitle: "Entrance exam registration".to_string(),
            dryrun: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Session token location; the platform data dir when unset
    pub token_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            token_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Pre-filled preferred language
    pub default_language: String,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            default_language: "fr".to_string(),
        }
    }
}
