//! Start-up configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `MOCK_API_BASE_PATH` | `/api` |
//! | `MOCK_LATENCY_MIN_MS` | `500` |
//! | `MOCK_LATENCY_MAX_MS` | `1500` |
//! | `MOCK_CURRENT_USER` | `first-seeded` |
//! | `MOCK_SIGNUP_ISSUES_TOKEN` | `false` |
//! | `API_BASE_URL` | `http://localhost:3000/api` |

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::latency::{RandomLatency, DEFAULT_MAX_LATENCY, DEFAULT_MIN_LATENCY};

pub const DEFAULT_BASE_PATH: &str = "/api";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a whole number of milliseconds, got {value:?}")]
    InvalidMillis { key: &'static str, value: String },
    #[error("MOCK_LATENCY_MIN_MS ({min}) must not exceed MOCK_LATENCY_MAX_MS ({max})")]
    LatencyRange { min: u64, max: u64 },
    #[error("{key} must be one of {expected}, got {value:?}")]
    InvalidChoice {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// How `GET /auth/me` picks the user it returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CurrentUserMode {
    /// Always the first record in the store, whatever the token says
    #[default]
    FirstSeeded,
    /// The record named by the token payload's `userId`
    TokenSubject,
}

impl FromStr for CurrentUserMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "first-seeded" => Ok(Self::FirstSeeded),
            "token-subject" => Ok(Self::TokenSubject),
            other => Err(ConfigError::InvalidChoice {
                key: "MOCK_CURRENT_USER",
                value: other.to_string(),
                expected: "first-seeded, token-subject",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Prefix every intercepted route lives under, without a trailing slash
    pub base_path: String,
    pub latency_min: Duration,
    pub latency_max: Duration,
    pub current_user: CurrentUserMode,
    pub issue_token_on_signup: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            latency_min: DEFAULT_MIN_LATENCY,
            latency_max: DEFAULT_MAX_LATENCY,
            current_user: CurrentUserMode::default(),
            issue_token_on_signup: false,
        }
    }
}

impl SimulatorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_path = lookup("MOCK_API_BASE_PATH")
            .map(|path| normalize_base_path(&path))
            .unwrap_or(defaults.base_path);

        let min = read_millis(&lookup, "MOCK_LATENCY_MIN_MS", defaults.latency_min)?;
        let max = read_millis(&lookup, "MOCK_LATENCY_MAX_MS", defaults.latency_max)?;
        if min > max {
            return Err(ConfigError::LatencyRange {
                min: min.as_millis() as u64,
                max: max.as_millis() as u64,
            });
        }

        let current_user = match lookup("MOCK_CURRENT_USER") {
            Some(value) => value.parse()?,
            None => defaults.current_user,
        };

        let issue_token_on_signup = match lookup("MOCK_SIGNUP_ISSUES_TOKEN") {
            Some(value) => parse_flag("MOCK_SIGNUP_ISSUES_TOKEN", &value)?,
            None => defaults.issue_token_on_signup,
        };

        Ok(Self {
            base_path,
            latency_min: min,
            latency_max: max,
            current_user,
            issue_token_on_signup,
        })
    }

    pub fn latency(&self) -> RandomLatency {
        RandomLatency::new(self.latency_min, self.latency_max)
    }
}

/// Settings for the client facade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute URL every endpoint path is appended to
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Self { base_url }
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn read_millis<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidMillis { key, value }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidChoice {
            key,
            value: value.to_string(),
            expected: "true, false",
        }),
    }
}
