use std::env;
use std::time::Duration;

use url::Url;

use assess_core::{DEFAULT_DURATION_SECS, DEFAULT_MAX_TAB_SWITCHES};

use crate::error::BackendError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where the assessment backend lives and how long to wait for it.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    base_url: Url,
    timeout: Duration,
}

impl BackendConfig {
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let mut url = Url::parse(base_url.trim())?;
        // Url::join drops the last segment unless the base ends in a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read `ASSESS_API_URL` and `ASSESS_API_TIMEOUT_SECS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if the configured URL does not parse.
    pub fn from_env() -> Result<Self, BackendError> {
        let base_url = env::var("ASSESS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let mut config = Self::new(&base_url)?;
        if let Some(secs) = env::var("ASSESS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if `path` cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

/// Knobs for a single timed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub duration_secs: u32,
    pub max_tab_switches: u32,
    pub notice_ttl_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            max_tab_switches: DEFAULT_MAX_TAB_SWITCHES,
            notice_ttl_secs: 3,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `ASSESS_DURATION_SECS` and `ASSESS_MAX_TAB_SWITCHES`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = read_u32("ASSESS_DURATION_SECS") {
            config.duration_secs = secs;
        }
        if let Some(limit) = read_u32("ASSESS_MAX_TAB_SWITCHES") {
            config.max_tab_switches = limit;
        }
        config
    }
}

fn read_u32(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}
