use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_MYSQL_PORT: u16 = 3306;

const EMPTY_CONFIG: &str = "databases = []\n";

fn default_port() -> u16 {
    DEFAULT_MYSQL_PORT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

impl DatabaseConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: DEFAULT_MYSQL_PORT,
            user: user.into(),
            password: None,
            database: None,
        }
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config directory is unavailable for this platform")]
    ConfigDirUnavailable,
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to create config directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no databases configured in {path}")]
    NoDatabases { path: PathBuf },
    #[error("database `{name}` is not configured in {path}")]
    UnknownDatabase { name: String, path: PathBuf },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    databases: Vec<DatabaseConfig>,
}

impl ConfigDocument {
    fn normalize(&mut self) {
        let mut by_name = std::collections::BTreeMap::new();
        for database in self.databases.drain(..) {
            by_name.insert(database.name.clone(), database);
        }
        self.databases = by_name.into_values().collect();
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    path: PathBuf,
    databases: Vec<DatabaseConfig>,
}

impl AppConfig {
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path()?;
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        create_config_if_missing(&path)?;

        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let mut doc: ConfigDocument = if raw.trim().is_empty() {
            ConfigDocument::default()
        } else {
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        };
        doc.normalize();

        Ok(Self {
            path,
            databases: doc.databases,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn databases(&self) -> &[DatabaseConfig] {
        &self.databases
    }

    pub fn select(&self, name: Option<&str>) -> Result<&DatabaseConfig, ConfigError> {
        match name {
            Some(name) => self
                .databases
                .iter()
                .find(|database| database.name == name)
                .ok_or_else(|| ConfigError::UnknownDatabase {
                    name: name.to_string(),
                    path: self.path.clone(),
                }),
            None => self.databases.first().ok_or_else(|| ConfigError::NoDatabases {
                path: self.path.clone(),
            }),
        }
    }
}

fn create_config_if_missing(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).map_err(|source| ConfigError::CreateDir {
            path: parent_dir.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, EMPTY_CONFIG).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "created empty config file");
    Ok(())
}

pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(custom) = env::var_os("PANEQL_CONFIG_DIR") {
        return Ok(PathBuf::from(custom));
    }

    let base_dir = if cfg!(target_os = "windows") {
        env::var_os("APPDATA")
            .map(PathBuf::from)
            .ok_or(ConfigError::ConfigDirUnavailable)?
    } else if let Some(xdg_config_home) = env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config_home)
    } else {
        let home = env::var_os("HOME").ok_or(ConfigError::ConfigDirUnavailable)?;
        PathBuf::from(home).join(".config")
    };

    Ok(base_dir.join("paneql"))
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join("config.toml"))
}
