//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TAGDESK_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TAGDESK_ROOT_FOLDER";

/// Database file created inside the root folder
pub const DATABASE_FILE_NAME: &str = "tagdesk.db";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Optional settings read from `config.toml`
///
/// Every key is optional; a missing file is not an error.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl TomlConfig {
    /// Parse a config file, failing on unreadable or invalid TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }

    /// Load the platform config file if one exists.
    ///
    /// A missing file yields `None`; an invalid file is logged and ignored so
    /// startup never fails on configuration alone.
    pub fn load_default() -> Option<Self> {
        let path = config_file_path()?;
        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                Some(config)
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Locate the config file for this platform, if present
///
/// Linux checks `~/.config/tagdesk/config.toml` then `/etc/tagdesk/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tagdesk").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tagdesk/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/tagdesk (or /var/lib/tagdesk for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("tagdesk"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tagdesk"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("tagdesk"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/tagdesk"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("tagdesk"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tagdesk"))
    } else {
        PathBuf::from("./tagdesk_data")
    }
}

/// Resolves the root folder following the priority order above
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config: Option<TomlConfig>,
}

impl RootFolderResolver {
    /// Create a resolver, reading the platform config file if present
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config: TomlConfig::load_default(),
        }
    }

    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Replace the config file contents (used by tests and explicit `--config`)
    pub fn with_config(mut self, config: Option<TomlConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> Option<&TomlConfig> {
        self.config.as_ref()
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!("[{}] root folder from command line", self.module_name);
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                debug!("[{}] root folder from {}", self.module_name, ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = self.config.as_ref().and_then(|c| c.root_folder.clone()) {
            debug!("[{}] root folder from config file", self.module_name);
            return path;
        }

        debug!("[{}] root folder from compiled default", self.module_name);
        default_root_folder()
    }
}

/// Creates the root folder and derives the database path inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}
