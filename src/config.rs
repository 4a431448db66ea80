//! Configuration for stagectl.
//!
//! Settings are read from TOML. An explicit `--config` path wins, then
//! `./stagectl.toml`, then `<config dir>/stagectl/config.toml`; without any
//! file the defaults apply. Environment variables override the file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, StagingError};
use crate::retry::{RetryLimit, RetryPolicy};

pub const DEFAULT_REPOSITORY: &str = "https://oss.sonatype.org/service/local";
pub const CONFIG_FILE_NAME: &str = "stagectl.toml";

pub const ENV_USERNAME: &str = "SONATYPE_USERNAME";
pub const ENV_PASSWORD: &str = "SONATYPE_PASSWORD";
pub const ENV_REPOSITORY: &str = "STAGECTL_REPOSITORY";
pub const ENV_PROFILE: &str = "STAGECTL_PROFILE";

/// Host wildcard used for credentials taken from the environment.
const ANY_HOST: &str = "*";

/// Largest accepted poll growth factor.
const MAX_MULTIPLIER: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the staging REST API
    pub repository: String,
    /// Staging profile name to operate on
    pub profile: Option<String>,
    pub poll: PollSettings,
    pub transport: TransportSettings,
    pub upload: UploadSettings,
    pub credentials: Vec<Credentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            profile: None,
            poll: PollSettings::default(),
            transport: TransportSettings::default(),
            upload: UploadSettings::default(),
            credentials: Vec::new(),
        }
    }
}

/// Lifecycle polling: how long to wait for close/promote to finish.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub multiplier: f64,
    pub jitter: f64,
    pub max_wait_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_policy(&RetryPolicy::poll_default())
    }
}

impl PollSettings {
    fn from_policy(policy: &RetryPolicy) -> Self {
        let max_wait_secs = match policy.limit {
            RetryLimit::MaxWait(budget) => budget.as_secs(),
            RetryLimit::MaxRetries(_) => 60 * 60,
        };
        Self {
            initial_interval_ms: policy.initial_interval.as_millis() as u64,
            max_interval_ms: policy.max_interval.as_millis() as u64,
            multiplier: policy.multiplier,
            jitter: policy.jitter,
            max_wait_secs,
        }
    }

    /// Reject growth parameters the backoff schedule cannot use.
    pub fn validate(&self) -> Result<()> {
        if !(1.0..=MAX_MULTIPLIER).contains(&self.multiplier) {
            return Err(StagingError::Config(format!(
                "poll.multiplier must be between 1 and {MAX_MULTIPLIER}, got {}",
                self.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(StagingError::Config(format!(
                "poll.jitter must be between 0 and 1, got {}",
                self.jitter
            )));
        }
        Ok(())
    }

    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
            multiplier: self.multiplier,
            jitter: self.jitter,
            limit: RetryLimit::MaxWait(Duration::from_secs(self.max_wait_secs)),
        }
    }
}

/// Per-request retry of the HTTP transport.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub max_retries: u32,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            max_retries: 15,
            initial_interval_ms: 500,
            max_interval_ms: 15_000,
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl TransportSettings {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::transport_default()
            .with_intervals(
                Duration::from_millis(self.initial_interval_ms),
                Duration::from_millis(self.max_interval_ms),
            )
            .with_limit(RetryLimit::MaxRetries(self.max_retries))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub max_retries: u32,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl UploadSettings {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::upload_default().with_limit(RetryLimit::MaxRetries(self.max_retries))
    }
}

/// Basic-auth credentials scoped to one host.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn matches(&self, host: &str) -> bool {
        self.host == ANY_HOST || self.host.eq_ignore_ascii_case(host)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_locations().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        Ok(config.with_env_overrides())
    }

    /// Candidate config files, most specific first.
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("stagectl").join("config.toml"));
        }
        locations
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StagingError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| StagingError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| StagingError::Config(e.to_string()))?;
        config.poll.validate()?;
        Ok(config)
    }

    /// Apply `STAGECTL_*` and `SONATYPE_*` environment variables.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(repository) = std::env::var(ENV_REPOSITORY) {
            self.repository = repository;
        }
        if let Ok(profile) = std::env::var(ENV_PROFILE) {
            self.profile = Some(profile);
        }
        if let (Ok(username), Ok(password)) =
            (std::env::var(ENV_USERNAME), std::env::var(ENV_PASSWORD))
        {
            self.credentials.insert(
                0,
                Credentials {
                    host: ANY_HOST.to_string(),
                    username,
                    password,
                },
            );
        }
        self
    }

    /// Host part of the repository URL.
    pub fn host(&self) -> Result<String> {
        let url = reqwest::Url::parse(&self.repository).map_err(|e| {
            StagingError::Config(format!("Invalid repository URL {}: {e}", self.repository))
        })?;
        url.host_str()
            .map(str::to_string)
            .ok_or_else(|| StagingError::Config(format!("No host in {}", self.repository)))
    }

    /// Credentials for `host`; environment credentials take precedence.
    pub fn credentials_for(&self, host: &str) -> Result<Credentials> {
        self.credentials
            .iter()
            .find(|c| c.matches(host))
            .cloned()
            .ok_or_else(|| {
                StagingError::Config(format!(
                    "No credentials for {host}. Set {ENV_USERNAME}/{ENV_PASSWORD} or add a [[credentials]] entry"
                ))
            })
    }

    pub fn profile_name(&self) -> Result<&str> {
        self.profile.as_deref().ok_or_else(|| {
            StagingError::Config(format!(
                "No staging profile configured. Pass --profile or set {ENV_PROFILE}"
            ))
        })
    }
}
