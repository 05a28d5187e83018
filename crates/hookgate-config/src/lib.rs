//! Configuration for the hookgate CLI.
//!
//! Settings are layered with figment: built-in defaults, then the TOML file
//! at the platform config directory, then `HOOKGATE_*` environment
//! variables. Nested keys use a double underscore in the environment
//! (`HOOKGATE_CACHE__PROVIDERS_SECS`). The result is read once at startup
//! and translated into the runtime configs of `hookgate-api` and
//! `hookgate-core`, neither of which reads files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use hookgate_api::ClientConfig;
use hookgate_core::{DashboardConfig, NotificationConfig, QueryConfig, RetryPolicy, StaleTimes};

const ENV_PREFIX: &str = "HOOKGATE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── Settings ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gateway base URL.
    pub api_url: String,
    pub timeout_secs: u64,
    pub log_level: String,
    pub log_format: LogFormat,
    pub features: Features,
    pub cache: CacheSettings,
    pub retry: RetrySettings,
    pub notifications: NotificationSettings,
    /// Overrides the platform default from [`default_token_path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            timeout_secs: 30,
            log_level: "info".into(),
            log_format: LogFormat::Pretty,
            features: Features::default(),
            cache: CacheSettings::default(),
            retry: RetrySettings::default(),
            notifications: NotificationSettings::default(),
            token_path: None,
        }
    }
}

/// Feature toggles shared with other gateway tooling.
///
/// Only `debug` changes this client's behaviour (it raises the log level).
/// `analytics` and `error_tracking` are carried through for forward
/// compatibility: they round-trip through `config show` and are logged at
/// startup, but nothing here reports to a third party.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub analytics: bool,
    pub error_tracking: bool,
    pub debug: bool,
}

/// Freshness windows in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub providers_secs: u64,
    pub webhooks_secs: u64,
    pub logs_secs: u64,
    pub health_secs: u64,
    pub gc_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            providers_secs: 300,
            webhooks_secs: 120,
            logs_secs: 60,
            health_secs: 30,
            gc_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Read retries after the first attempt.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
    /// Mutation retries after the first attempt.
    pub mutation_attempts: u32,
    pub mutation_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            backoff_multiplier: 2.0,
            max_delay_ms: 30_000,
            mutation_attempts: 1,
            mutation_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub max_visible: usize,
    pub default_duration_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            max_visible: 5,
            default_duration_ms: 5000,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "hookgate", "hookgate")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Config file location via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "hookgate", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where the bearer token is persisted when `token_path` is unset.
pub fn default_token_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "hookgate", "token"]),
        |dirs| dirs.data_dir().join("token"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

impl Settings {
    /// Load from the platform config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load from `path` (which may not exist) and the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings: Self = Self::figment(path).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The layered provider, exposed so callers can merge flag overrides.
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be greater than zero"));
        }
        let multiplier = self.retry.backoff_multiplier;
        if multiplier.is_nan() || multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "retry.backoff_multiplier",
                format!("must be at least 1, got {multiplier}"),
            ));
        }
        if self.notifications.max_visible == 0 {
            return Err(ConfigError::invalid(
                "notifications.max_visible",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| ConfigError::invalid("api_url", format!("{e}: {}", self.api_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "api_url",
                format!("expected an http(s) URL, got {}", self.api_url),
            ));
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(default_token_path)
    }

    // ── Translation ──────────────────────────────────────────────────

    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        Ok(ClientConfig::new(self.base_url()?, self.timeout()))
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        let cache = &self.cache;
        let retry = &self.retry;
        DashboardConfig {
            stale_times: StaleTimes {
                providers: Duration::from_secs(cache.providers_secs),
                webhooks: Duration::from_secs(cache.webhooks_secs),
                logs: Duration::from_secs(cache.logs_secs),
                health: Duration::from_secs(cache.health_secs),
            },
            query: QueryConfig {
                read_retry: RetryPolicy {
                    max_retries: retry.max_attempts,
                    base_delay: Duration::from_millis(retry.base_delay_ms),
                    multiplier: retry.backoff_multiplier,
                    max_delay: Duration::from_millis(retry.max_delay_ms),
                },
                mutation_retry: RetryPolicy::fixed(
                    retry.mutation_attempts,
                    Duration::from_millis(retry.mutation_delay_ms),
                ),
                gc_time: Duration::from_secs(cache.gc_secs),
            },
            notifications: NotificationConfig {
                max_visible: self.notifications.max_visible,
                default_duration: Duration::from_millis(self.notifications.default_duration_ms),
            },
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
