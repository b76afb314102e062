//! Loading and layering of viewsync settings.
//!
//! Defaults, then the TOML file, then `VIEWSYNC_*` variables, then CLI flags.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::codec::{DEFAULT_FILTER_PREFIX, DEFAULT_SEARCH_PARAM, DEFAULT_SORT_PARAM};
use crate::model::{ColumnId, ColumnSizing, SortMode};
use crate::state::{
    ColumnOrderOptions, ColumnSizingOptions, FilterOptions, SearchOptions, SortOptions,
    DEFAULT_DEBOUNCE_MS, DEFAULT_ORDER_NAMESPACE, DEFAULT_SIZING_NAMESPACE,
};
use crate::sync::{default_storage_path, HistoryMode};
use crate::view_state::{WindowOptions, DEFAULT_ESTIMATE_ROW_HEIGHT, DEFAULT_OVERSCAN};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "VIEWSYNC_CONFIG";

/// Environment variable overriding the search debounce window.
pub const DEBOUNCE_ENV: &str = "VIEWSYNC_DEBOUNCE_MS";

/// Environment variable overriding the storage file location.
pub const STORAGE_PATH_ENV: &str = "VIEWSYNC_STORAGE_PATH";

/// Why a configuration source was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// File that was being read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// File that was being parsed.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// An environment override could not be parsed.
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parse error details.
        reason: String,
    },
}

/// On-disk settings. Every key is optional; unknown keys are rejected.
///
/// Corresponds to `~/.config/viewsync/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Prefix of filter query parameters.
    #[serde(default)]
    pub filter_prefix: Option<String>,

    /// Sort query parameter name.
    #[serde(default)]
    pub sort_param: Option<String>,

    /// Search query parameter name.
    #[serde(default)]
    pub search_param: Option<String>,

    /// Mirror the committed search into the URL.
    #[serde(default)]
    pub search_in_url: Option<bool>,

    /// `replace` or `push`.
    #[serde(default)]
    pub history_mode: Option<HistoryMode>,

    /// Search debounce window in milliseconds.
    #[serde(default)]
    pub debounce_ms: Option<u64>,

    /// Storage namespace for column order.
    #[serde(default)]
    pub order_namespace: Option<String>,

    /// Storage namespace for column widths.
    #[serde(default)]
    pub sizing_namespace: Option<String>,

    /// JSON file backing durable storage.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,

    /// Estimated row height in pixels.
    #[serde(default)]
    pub estimate_row_height: Option<usize>,

    /// Rows rendered beyond each viewport edge.
    #[serde(default)]
    pub overscan: Option<usize>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Settings after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Prefix of filter query parameters.
    pub filter_prefix: String,
    /// Sort query parameter name.
    pub sort_param: String,
    /// Search query parameter name.
    pub search_param: String,
    /// Mirror the committed search into the URL.
    pub search_in_url: bool,
    /// How URL writes land in history.
    pub history_mode: HistoryMode,
    /// Search debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Storage namespace for column order.
    pub order_namespace: String,
    /// Storage namespace for column widths.
    pub sizing_namespace: String,
    /// JSON file backing durable storage.
    pub storage_path: PathBuf,
    /// Estimated row height in pixels.
    pub estimate_row_height: usize,
    /// Rows rendered beyond each viewport edge.
    pub overscan: usize,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            filter_prefix: DEFAULT_FILTER_PREFIX.to_string(),
            sort_param: DEFAULT_SORT_PARAM.to_string(),
            search_param: DEFAULT_SEARCH_PARAM.to_string(),
            search_in_url: false,
            history_mode: HistoryMode::Replace,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            order_namespace: DEFAULT_ORDER_NAMESPACE.to_string(),
            sizing_namespace: DEFAULT_SIZING_NAMESPACE.to_string(),
            storage_path: default_storage_path(),
            estimate_row_height: DEFAULT_ESTIMATE_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Filter manager options.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            param_prefix: self.filter_prefix.clone(),
            history_mode: self.history_mode,
            ..FilterOptions::default()
        }
    }

    /// Sort manager options for `mode`.
    pub fn sort_options(&self, mode: SortMode) -> SortOptions {
        SortOptions {
            mode,
            param_name: self.sort_param.clone(),
            history_mode: self.history_mode,
            ..SortOptions::default()
        }
    }

    /// Search manager options scoped to `searchable_columns`.
    pub fn search_options(&self, searchable_columns: Vec<ColumnId>) -> SearchOptions {
        SearchOptions {
            debounce_ms: self.debounce_ms,
            sync_with_url: self.search_in_url,
            param_name: self.search_param.clone(),
            history_mode: self.history_mode,
            searchable_columns,
            ..SearchOptions::default()
        }
    }

    /// Column order manager options.
    pub fn column_order_options(
        &self,
        table_id: &str,
        columns: Vec<ColumnId>,
    ) -> ColumnOrderOptions {
        ColumnOrderOptions {
            namespace: self.order_namespace.clone(),
            ..ColumnOrderOptions::new(table_id, columns)
        }
    }

    /// Column sizing manager options.
    pub fn column_sizing_options(
        &self,
        table_id: &str,
        default_sizes: ColumnSizing,
    ) -> ColumnSizingOptions {
        ColumnSizingOptions {
            namespace: self.sizing_namespace.clone(),
            default_sizes,
            ..ColumnSizingOptions::new(table_id)
        }
    }

    /// Windowing options.
    pub fn window_options(&self) -> WindowOptions {
        WindowOptions {
            estimate_row_height: self.estimate_row_height,
            overscan: self.overscan,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/viewsync/viewsync.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("viewsync").join("viewsync.log")
    } else {
        PathBuf::from("viewsync.log")
    }
}

/// Read the config file at `path`.
///
/// A missing file yields `Ok(None)`.
///
/// # Errors
///
/// `ReadError` or `ParseError` when the file exists but is unusable.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/viewsync/config.toml` on Unix, appropriate path on other platforms.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("viewsync").join("config.toml"))
}

/// Find and read the config file.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `VIEWSYNC_CONFIG` environment variable
/// 3. Default path `~/.config/viewsync/config.toml`
///
/// The first candidate path wins even if the file is missing.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Fill every key the file leaves unset from the defaults.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        filter_prefix: config.filter_prefix.unwrap_or(defaults.filter_prefix),
        sort_param: config.sort_param.unwrap_or(defaults.sort_param),
        search_param: config.search_param.unwrap_or(defaults.search_param),
        search_in_url: config.search_in_url.unwrap_or(defaults.search_in_url),
        history_mode: config.history_mode.unwrap_or(defaults.history_mode),
        debounce_ms: config.debounce_ms.unwrap_or(defaults.debounce_ms),
        order_namespace: config.order_namespace.unwrap_or(defaults.order_namespace),
        sizing_namespace: config.sizing_namespace.unwrap_or(defaults.sizing_namespace),
        storage_path: config.storage_path.unwrap_or(defaults.storage_path),
        estimate_row_height: config
            .estimate_row_height
            .unwrap_or(defaults.estimate_row_height),
        overscan: config.overscan.unwrap_or(defaults.overscan),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply `VIEWSYNC_*` environment overrides.
///
/// Checks for:
/// - `VIEWSYNC_DEBOUNCE_MS`: Override debounce window
/// - `VIEWSYNC_STORAGE_PATH`: Override storage file
///
/// # Errors
///
/// Returns error if `VIEWSYNC_DEBOUNCE_MS` is not a non-negative integer.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(DEBOUNCE_ENV) {
        config.debounce_ms = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidEnv {
                var: DEBOUNCE_ENV,
                value: raw.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    if let Ok(path) = std::env::var(STORAGE_PATH_ENV) {
        config.storage_path = PathBuf::from(path);
    }

    Ok(config)
}

/// Apply command-line flags, the highest layer. `None` keeps the lower layer's value.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    storage_path_override: Option<PathBuf>,
    history_mode_override: Option<HistoryMode>,
    debounce_override: Option<u64>,
) -> ResolvedConfig {
    if let Some(path) = storage_path_override {
        config.storage_path = path;
    }

    if let Some(mode) = history_mode_override {
        config.history_mode = mode;
    }

    if let Some(debounce_ms) = debounce_override {
        config.debounce_ms = debounce_ms;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
