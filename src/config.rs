use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, instrument, trace};

/// How the storage permission is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    /// Ask on the terminal when access is needed
    #[default]
    Ask,
    Granted,
    /// Denied for good, never asked
    Denied,
}

impl FromStr for PermissionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ask" => Ok(PermissionPolicy::Ask),
            "granted" | "grant" | "yes" => Ok(PermissionPolicy::Granted),
            "denied" | "deny" | "no" => Ok(PermissionPolicy::Denied),
            other => Err(DomainError::Other(format!(
                "Unknown storage permission policy: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PermissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionPolicy::Ask => write!(f, "ask"),
            PermissionPolicy::Granted => write!(f, "granted"),
            PermissionPolicy::Denied => write!(f, "denied"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Path to the SQLite database bookmarks are imported into
    #[serde(default = "default_db_path")]
    pub db_url: String,

    /// File holding persisted flags such as "permission dialog presented"
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Default access scope; files here are opened directly
    #[serde(default = "default_private_dir")]
    pub private_dir: PathBuf,

    #[serde(default)]
    pub storage_permission: PermissionPolicy,
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/bkimport")
}

fn default_db_path() -> String {
    let db_path = config_dir().join("bkimport.db");
    db_path.to_string_lossy().into_owned()
}

fn default_state_file() -> PathBuf {
    config_dir().join("state.toml")
}

fn default_private_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bkimport")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_url: default_db_path(),
            state_file: default_state_file(),
            private_dir: default_private_dir(),
            storage_permission: PermissionPolicy::default(),
        }
    }
}

/// Load settings: defaults, then a config file, then environment variables.
///
/// An explicit `config_file` must exist; the default location is optional.
#[instrument(level = "debug")]
pub fn load_settings(config_file: Option<&Path>) -> DomainResult<Settings> {
    trace!("Loading settings");

    let mut settings = match config_file {
        Some(path) => {
            if !path.exists() {
                return Err(DomainError::Other(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            read_config_file(path)?
        }
        None => {
            let default_path = config_dir().join("config.toml");
            if default_path.exists() {
                read_config_file(&default_path)?
            } else {
                Settings::default()
            }
        }
    };

    if let Ok(db_url) = std::env::var("BKIMPORT_DB_URL") {
        trace!("Using BKIMPORT_DB_URL from environment: {}", db_url);
        settings.db_url = db_url;
    }

    if let Ok(state_file) = std::env::var("BKIMPORT_STATE_FILE") {
        trace!("Using BKIMPORT_STATE_FILE from environment: {}", state_file);
        settings.state_file = PathBuf::from(state_file);
    }

    if let Ok(private_dir) = std::env::var("BKIMPORT_PRIVATE_DIR") {
        trace!("Using BKIMPORT_PRIVATE_DIR from environment: {}", private_dir);
        settings.private_dir = PathBuf::from(private_dir);
    }

    if let Ok(policy) = std::env::var("BKIMPORT_STORAGE_PERMISSION") {
        trace!("Using BKIMPORT_STORAGE_PERMISSION from environment: {}", policy);
        settings.storage_permission = policy.parse()?;
    }

    debug!("Settings loaded: {:?}", settings);
    Ok(settings)
}

fn read_config_file(path: &Path) -> DomainResult<Settings> {
    trace!("Loading config from: {:?}", path);
    let config_text = std::fs::read_to_string(path)?;
    toml::from_str::<Settings>(&config_text).map_err(|e| {
        DomainError::Other(format!("Invalid config file {}: {}", path.display(), e))
    })
}

pub fn generate_default_config() -> String {
    let default_settings = Settings::default();
    toml::to_string_pretty(&default_settings)
        .unwrap_or_else(|_| "# Error generating default configuration".to_string())
}
