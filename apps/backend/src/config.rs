//! Runtime configuration read from the environment

use std::str::FromStr;
use std::time::Duration;

use schedule_core::{IntervalPolicy, SECONDS_PER_DAY};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub review: ReviewSettings,
}

/// Tuning for the review write path
#[derive(Debug, Clone)]
pub struct ReviewSettings {
    pub policy: IntervalPolicy,
    /// Attempts per submission when the store reports a transient fault.
    pub max_attempts: u32,
    pub lock_timeout: Duration,
    pub retry_backoff: Duration,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            policy: IntervalPolicy::default(),
            max_attempts: 3,
            lock_timeout: Duration::from_millis(5000),
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// Required env vars:
    /// - DATABASE_URL: PostgreSQL connection string
    ///
    /// Everything else falls back to a default when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let defaults = IntervalPolicy::default();
        let policy = IntervalPolicy {
            retry_interval_seconds: non_negative(
                "RETRY_INTERVAL_SECONDS",
                parse_or(&lookup, "RETRY_INTERVAL_SECONDS", defaults.retry_interval_seconds)?,
            )?,
            initial_easy_seconds: days(&lookup, "INITIAL_INTERVAL_EASY_DAYS", 30)?,
            initial_hard_seconds: days(&lookup, "INITIAL_INTERVAL_HARD_DAYS", 3)?,
            easy_multiplier: multiplier(&lookup, "EASY_MULTIPLIER", defaults.easy_multiplier)?,
            hard_multiplier: multiplier(&lookup, "HARD_MULTIPLIER", defaults.hard_multiplier)?,
        };

        let max_attempts: u32 = parse_or(&lookup, "REVIEW_MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "REVIEW_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            review: ReviewSettings {
                policy,
                max_attempts,
                lock_timeout: Duration::from_millis(parse_or(&lookup, "REVIEW_LOCK_TIMEOUT_MS", 5000)?),
                retry_backoff: Duration::from_millis(parse_or(&lookup, "REVIEW_RETRY_BACKOFF_MS", 50)?),
            },
        })
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn non_negative(key: &'static str, value: i64) -> Result<i64, ConfigError> {
    if value < 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn days<F>(lookup: &F, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let days = non_negative(key, parse_or(lookup, key, default)?)?;
    days.checked_mul(SECONDS_PER_DAY).ok_or(ConfigError::Invalid {
        key,
        value: days.to_string(),
    })
}

fn multiplier<F>(lookup: &F, key: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(lookup, key, default)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}
