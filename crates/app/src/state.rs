use std::time::Duration;
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use common::blobs::FsBlobStore;
use common::store::{FileStateProvider, Store};
use common::workspace::{Settings, Workspace};

pub const APP_NAME: &str = "burrow";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATA_FILE_NAME: &str = "state.json";
pub const BLOBS_DIR_NAME: &str = "blobs";

pub type BurrowWorkspace = Workspace<FileStateProvider, FsBlobStore>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document file (defaults to <burrow dir>/state.json)
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    /// Blob directory (defaults to <burrow dir>/blobs)
    #[serde(default)]
    pub blobs_dir: Option<PathBuf>,
    /// How long a command waits for another one to finish
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// Entries per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Default log directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Write daily rolling log files here as well
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_page_size() -> usize {
    common::tree::DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            blobs_dir: None,
            lock_timeout_ms: default_lock_timeout_ms(),
            page_size: default_page_size(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::WARN)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the burrow directory (~/.burrow)
    pub burrow_dir: PathBuf,
    /// Path to the persisted document
    pub data_path: PathBuf,
    /// Path to the blobs directory
    pub blobs_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the burrow directory path (custom or default ~/.burrow)
    pub fn burrow_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new burrow directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let burrow_dir = Self::burrow_dir(custom_path)?;

        if burrow_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&burrow_dir)?;

        let config = config.unwrap_or_default();
        let config_path = burrow_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        let (data_path, blobs_path) = Self::paths(&burrow_dir, &config);
        fs::create_dir_all(&blobs_path)?;

        Ok(Self {
            burrow_dir,
            data_path,
            blobs_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the burrow directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let burrow_dir = Self::burrow_dir(custom_path)?;

        if !burrow_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = burrow_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        let (data_path, blobs_path) = Self::paths(&burrow_dir, &config);

        Ok(Self {
            burrow_dir,
            data_path,
            blobs_path,
            config_path,
            config,
        })
    }

    fn paths(burrow_dir: &std::path::Path, config: &AppConfig) -> (PathBuf, PathBuf) {
        let data_path = config
            .data_file
            .clone()
            .unwrap_or_else(|| burrow_dir.join(DATA_FILE_NAME));
        let blobs_path = config
            .blobs_dir
            .clone()
            .unwrap_or_else(|| burrow_dir.join(BLOBS_DIR_NAME));
        (data_path, blobs_path)
    }

    /// Open the workspace described by this state
    pub async fn workspace(&self) -> Result<BurrowWorkspace, StateError> {
        let store = Store::with_timeout(
            FileStateProvider::new(&self.data_path),
            Duration::from_millis(self.config.lock_timeout_ms),
        );
        let blobs = FsBlobStore::open(&self.blobs_path)
            .await
            .map_err(|e| StateError::Blobs(e.to_string()))?;
        Ok(Workspace::new(store, blobs).with_settings(Settings {
            page_size: self.config.page_size.max(1),
        }))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("burrow directory not initialized. Run 'burrow init' first")]
    NotInitialized,

    #[error("burrow directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("blob store unavailable: {0}")]
    Blobs(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
