//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--filter-mode`, `--remote`, `--offline`, etc.)
//! 2. Explicit `--config` file
//! 3. `$CHECKLIST_TUI_CONFIG` environment variable (path to config file)
//! 4. Project-local `.checklist-tui.toml` in the current working directory
//! 5. Global `~/.config/checklist-tui/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::tree::FilterMode;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Ask before deleting an item.
    pub confirm_delete: Option<bool>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Filter settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// "prune" or "hide".
    pub mode: Option<String>,
}

/// Remote document store settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: Option<bool>,
    /// Base URL of the document store API.
    pub base_url: Option<String>,
    /// Bearer token sent with every request.
    pub api_key: Option<String>,
    /// Where the document id is remembered between sessions.
    pub cache_file: Option<String>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<String>,
    /// Filter directive used when `RUST_LOG` is unset, e.g. "debug".
    pub level: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub filter: FilterConfig,
    pub remote: RemoteConfig,
    pub log: LogConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default document store URL.
pub const DEFAULT_REMOTE_URL: &str = "http://localhost:17020/api";
/// Default log level directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; `load` handles that separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("CHECKLIST_TUI_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".checklist-tui.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("checklist-tui").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
///
/// Runs before logging is installed, hence stderr.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`: `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            filter: FilterConfig {
                mode: other.filter.mode.clone().or(self.filter.mode),
            },
            remote: RemoteConfig {
                enabled: other.remote.enabled.or(self.remote.enabled),
                base_url: other.remote.base_url.clone().or(self.remote.base_url),
                api_key: other.remote.api_key.clone().or(self.remote.api_key),
                cache_file: other.remote.cache_file.clone().or(self.remote.cache_file),
            },
            log: LogConfig {
                file: other.log.file.clone().or(self.log.file),
                level: other.log.level.clone().or(self.log.level),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// Filter mode; unknown names fall back to hide-flag mode.
    pub fn filter_mode(&self) -> FilterMode {
        self.filter
            .mode
            .as_deref()
            .and_then(FilterMode::parse)
            .unwrap_or_default()
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.enabled.unwrap_or(false)
    }

    pub fn remote_url(&self) -> &str {
        self.remote.base_url.as_deref().unwrap_or(DEFAULT_REMOTE_URL)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.remote.api_key.as_deref()
    }

    /// Document id cache location, if one can be determined.
    pub fn cache_file(&self) -> Option<PathBuf> {
        match &self.remote.cache_file {
            Some(path) => Some(PathBuf::from(path)),
            None => crate::remote::cache::DocIdCache::default_path(),
        }
    }

    /// Log file location, if one can be determined.
    pub fn log_file(&self) -> Option<PathBuf> {
        match &self.log.file {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::data_dir().map(|d| d.join("checklist-tui").join("checklist.log")),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
