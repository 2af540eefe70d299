//! Application configuration for Content Profiler.
//!
//! Credentials come from the environment (`OPENAI_API_KEY`, `GOOGLE_API_KEY`,
//! `GOOGLE_CSE_ID`, plus optional per-API Google keys). Tunables live in an
//! optional TOML file at `~/.contentprofiler/contentprofiler.toml`, or the
//! path given with `--config`. Missing sections fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ContentProfilerError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contentprofiler.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contentprofiler";

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_GOOGLE_CSE_ID: &str = "GOOGLE_CSE_ID";
pub const ENV_PAGESPEED_API_KEY: &str = "GOOGLE_PAGESPEED_API_KEY";
pub const ENV_PLACES_API_KEY: &str = "GOOGLE_PLACES_API_KEY";

// ---------------------------------------------------------------------------
// Credentials (environment)
// ---------------------------------------------------------------------------

/// API credentials, resolved once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub google_api_key: String,
    pub google_cse_id: String,
    /// Falls back to `google_api_key` when `GOOGLE_PAGESPEED_API_KEY` is unset.
    pub pagespeed_api_key: String,
    /// Falls back to `google_api_key` when `GOOGLE_PLACES_API_KEY` is unset.
    pub places_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("google_cse_id", &self.google_cse_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| ContentProfilerError::config(format!("{name} is required")))
        };

        let openai_api_key = require(ENV_OPENAI_API_KEY)?;
        let google_api_key = require(ENV_GOOGLE_API_KEY)?;
        let google_cse_id = require(ENV_GOOGLE_CSE_ID)?;
        let pagespeed_api_key =
            get(ENV_PAGESPEED_API_KEY).unwrap_or_else(|| google_api_key.clone());
        let places_api_key = get(ENV_PLACES_API_KEY).unwrap_or_else(|| google_api_key.clone());

        Ok(Self {
            openai_api_key,
            google_api_key,
            google_cse_id,
            pagespeed_api_key,
            places_api_key,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings (contentprofiler.toml)
// ---------------------------------------------------------------------------

/// Tunables, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub openai: OpenAiSettings,
    #[serde(default)]
    pub google: GoogleSettings,
    #[serde(default)]
    pub scrape: ScrapeSettings,
    #[serde(default)]
    pub bulk: BulkSettings,
}

/// `[http]` section: timeout and retry policy for every outbound call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    20
}
fn default_max_attempts() -> u32 {
    4
}
fn default_initial_backoff_ms() -> u64 {
    500
}
fn default_max_backoff_ms() -> u64 {
    8_000
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_openai_base_url(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

/// `[google]` section. Base URLs are overridable for proxies and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    /// Host for Custom Search and PageSpeed.
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,
    /// Host for Places and Geocoding.
    #[serde(default = "default_maps_base_url")]
    pub maps_base_url: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            search_base_url: default_search_base_url(),
            maps_base_url: default_maps_base_url(),
        }
    }
}

fn default_search_base_url() -> String {
    "https://www.googleapis.com".into()
}
fn default_maps_base_url() -> String {
    "https://maps.googleapis.com".into()
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSettings {
    /// Pages per run, the primary page included.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_max_social_profiles")]
    pub max_social_profiles: usize,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_social_profiles: default_max_social_profiles(),
        }
    }
}

fn default_max_pages() -> usize {
    12
}
fn default_max_social_profiles() -> usize {
    5
}

/// `[bulk]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSettings {
    #[serde(default = "default_target_count")]
    pub target_count: usize,
    #[serde(default = "default_initial_radius_m")]
    pub initial_radius_m: u32,
    #[serde(default = "default_max_radius_m")]
    pub max_radius_m: u32,
    #[serde(default = "default_max_radius_rounds")]
    pub max_radius_rounds: u32,
    /// Pause before fetching a `next_page_token` page; the token is not
    /// valid until a short time after it is issued.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// Pause after each profiled business.
    #[serde(default = "default_business_delay_ms")]
    pub business_delay_ms: u64,
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            target_count: default_target_count(),
            initial_radius_m: default_initial_radius_m(),
            max_radius_m: default_max_radius_m(),
            max_radius_rounds: default_max_radius_rounds(),
            page_delay_ms: default_page_delay_ms(),
            business_delay_ms: default_business_delay_ms(),
        }
    }
}

impl BulkSettings {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn business_delay(&self) -> Duration {
        Duration::from_millis(self.business_delay_ms)
    }
}

fn default_target_count() -> usize {
    20
}
fn default_initial_radius_m() -> u32 {
    5_000
}
fn default_max_radius_m() -> u32 {
    100_000
}
fn default_max_radius_rounds() -> u32 {
    6
}
fn default_page_delay_ms() -> u64 {
    2_000
}
fn default_business_delay_ms() -> u64 {
    1_000
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Everything a run needs, built once and passed down by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub settings: Settings,
}

impl AppConfig {
    /// Credentials from the environment plus settings from `config_path`
    /// (or the default location when `None`).
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let settings = match config_path {
            Some(path) => load_settings_from(path)?,
            None => load_settings()?,
        };
        let credentials = Credentials::from_env()?;
        Ok(Self {
            credentials,
            settings,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contentprofiler/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentProfilerError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the default settings file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load settings from the default location. Returns defaults if the file does not exist.
pub fn load_settings() -> Result<Settings> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default settings");
            return Ok(Settings::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "settings file not found, using defaults");
        return Ok(Settings::default());
    }

    load_settings_from(&path)
}

/// Load settings from a specific file path. The file must exist.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentProfilerError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ContentProfilerError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
