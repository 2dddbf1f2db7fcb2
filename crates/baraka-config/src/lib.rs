use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use baraka_core::lookup::{is_valid_field_name, PhoneQuery, DEFAULT_PHONE_FIELD};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "baraka";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_LOOKUP_TABLE: &str = "customers";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub lookup: LookupConfig,
}

/// Where `lookup` searches when the command line does not say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub table: String,
    pub phone_field: String,
    pub select: Vec<String>,
}

impl LookupConfig {
    pub fn to_query(&self) -> PhoneQuery {
        PhoneQuery::new(self.table.clone())
            .with_phone_field(self.phone_field.clone())
            .with_select(self.select.iter().cloned())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lookup: LookupConfig {
                table: DEFAULT_LOOKUP_TABLE.to_string(),
                phone_field: DEFAULT_PHONE_FIELD.to_string(),
                select: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid lookup.{field} name: {value:?}")]
    InvalidLookupName { field: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    lookup: Option<LookupFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LookupFile {
    table: Option<String>,
    phone_field: Option<String>,
    select: Option<Vec<String>>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(lookup) = parsed.lookup {
        if let Some(table) = lookup.table {
            config.lookup.table = checked_name("table", table)?;
        }
        if let Some(phone_field) = lookup.phone_field {
            config.lookup.phone_field = checked_name("phone_field", phone_field)?;
        }
        if let Some(select) = lookup.select {
            config.lookup.select = select
                .into_iter()
                .map(|field| checked_name("select", field))
                .collect::<Result<Vec<_>>>()?;
        }
    }

    Ok(config)
}

fn checked_name(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if !is_valid_field_name(trimmed) {
        return Err(ConfigError::InvalidLookupName { field, value });
    }
    Ok(trimmed.to_string())
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
