use crate::error::{HarnessError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "http://localhost:8080/blacklab-server";
pub const DEFAULT_USER: &str = "user";
pub const DEFAULT_WINDOW_SIZE: u32 = 50;
pub const DEFAULT_FIXTURE_ROOT: &str = "./fixtures";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Everything a scenario run needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Sent as `number` on query calls.
    pub window_size: u32,
    /// Sent as `wordsaroundhit` when set, so hits come back with context.
    pub words_around_hit: Option<u32>,
    pub fixture_root: PathBuf,
    pub request_timeout: Duration,
    /// Delete each scenario's index once the scenario ends.
    pub cleanup: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HOST.to_string(),
            username: DEFAULT_USER.to_string(),
            password: String::new(),
            window_size: DEFAULT_WINDOW_SIZE,
            words_around_hit: None,
            fixture_root: PathBuf::from(DEFAULT_FIXTURE_ROOT),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cleanup: false,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset.
    ///
    /// Optional: BLACKLAB_HOST, BLACKLAB_USER, BLACKLAB_PASSWORD,
    /// BLACKLAB_WINDOW_SIZE, BLACKLAB_WORDS_AROUND_HIT, TEST_DATA_ROOT,
    /// BLACKLAB_TIMEOUT_SECS, BLACKLAB_CLEANUP
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: env::var("BLACKLAB_HOST").unwrap_or(defaults.base_url),
            username: env::var("BLACKLAB_USER").unwrap_or(defaults.username),
            password: env::var("BLACKLAB_PASSWORD").unwrap_or(defaults.password),
            window_size: parse_var("BLACKLAB_WINDOW_SIZE")?.unwrap_or(defaults.window_size),
            words_around_hit: parse_var("BLACKLAB_WORDS_AROUND_HIT")?,
            fixture_root: env::var("TEST_DATA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.fixture_root),
            request_timeout: parse_var("BLACKLAB_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            cleanup: parse_flag("BLACKLAB_CLEANUP")?.unwrap_or(defaults.cleanup),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(HarnessError::Config(
                "window size must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(HarnessError::Config(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.password.is_empty() {
            tracing::warn!("BlackLab password is empty; requests will use an empty basic-auth password");
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| HarnessError::Config(format!("Invalid {}: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Boolean setting values: `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`,
/// in any case. Anything else is `None`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_flag(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or_else(|| HarnessError::Config(format!("Invalid {}: {}", name, raw))),
        Err(_) => Ok(None),
    }
}
