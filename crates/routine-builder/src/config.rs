// Configuration loading and parsing (app.toml, credentials.toml).

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
    pub chat: ChatConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// app.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire app.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AppFile {
    catalog: CatalogConfig,
    #[serde(default)]
    storage: StorageConfig,
    chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Path to the `{ "products": [...] }` JSON file, relative to the
    /// working directory unless absolute.
    pub path: String,
}

pub const DEFAULT_SELECTION_KEY: &str = "selectedProducts";

fn default_selection_key() -> String {
    DEFAULT_SELECTION_KEY.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// SQLite file. When omitted the platform data directory is used.
    #[serde(default)]
    pub db_path: Option<String>,
    #[serde(default = "default_selection_key")]
    pub selection_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            db_path: None,
            selection_key: default_selection_key(),
        }
    }
}

impl StorageConfig {
    /// The database file to open: the configured path, or
    /// `<data dir>/routine-builder.db`.
    pub fn resolve_db_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.db_path {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "routine-builder").ok_or_else(|| {
            ConfigError::ValidationError {
                field: "storage.db_path".into(),
                message: "not set and no platform data directory is available".into(),
            }
        })?;
        Ok(dirs.data_dir().join("routine-builder.db"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Chat-completions URL. Chat is disabled when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    pub model: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub stream: bool,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/app.toml` and (optionally)
/// `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let app: AppFile = parse_toml(&config_dir.join("app.toml"))?;

    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        parse_toml(&credentials_path)?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        catalog: app.catalog,
        storage: app.storage,
        chat: app.chat,
        credentials,
    };
    validate(&config)?;
    Ok(config)
}

/// Copy every file in `defaults/` that is missing from `config/`, except
/// `.example` templates. Returns the paths written.
///
/// Without a `defaults/` directory this is a no-op, as long as `config/`
/// exists.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(copy_error(format!(
            "no defaults/ or config/ directory under {}",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let listing = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut templates = Vec::new();
    for entry in listing {
        let path = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        let is_template = path
            .extension()
            .is_some_and(|ext| ext == "example");
        if path.is_file() && !is_template {
            templates.push(path);
        }
    }

    let mut written = Vec::new();
    for source in templates {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if install_default(&source, &target)? {
            written.push(target);
        }
    }
    Ok(written)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy `source` to `target`. Returns `false` if `target` already exists.
fn install_default(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    if target.exists() {
        return Ok(false);
    }
    // Read first so a missing source never leaves an empty target behind.
    let bytes = std::fs::read(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    let mut dest = match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    if let Err(e) = dest.write_all(&bytes) {
        drop(dest);
        let _ = std::fs::remove_file(target);
        return Err(copy_error(format!("cannot write {}: {e}", target.display())));
    }
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let required: &[(&str, &str)] = &[
        ("catalog.path", config.catalog.path.as_str()),
        ("storage.selection_key", config.storage.selection_key.as_str()),
        ("chat.model", config.chat.model.as_str()),
    ];
    for (name, val) in required {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if let Some(endpoint) = &config.chat.endpoint {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                field: "chat.endpoint".into(),
                message: format!("must be an http(s) URL, got {endpoint:?}"),
            });
        }
    }

    if config.chat.max_tokens == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "chat.max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    if let Some(t) = config.chat.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(ConfigError::ValidationError {
                field: "chat.temperature".into(),
                message: format!("must be between 0.0 and 2.0 inclusive, got {t}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
