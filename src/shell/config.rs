// Runtime configuration from the environment.
//
// Purpose
// - Collect every tunable in one struct, read once at startup.
//
// Testing guidance
// - Use `Config::from_lookup` with a map instead of mutating the process environment.

use crate::shared::core::calendar::WorkCalendar;
use chrono::Weekday;
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "TIME_TRACKING_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppType {
    Hub,
    Clock,
}

impl AppType {
    pub fn as_str(self) -> &'static str {
        match self {
            AppType::Hub => "hub",
            AppType::Clock => "clock",
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hub" => Ok(AppType::Hub),
            "clock" => Ok(AppType::Clock),
            _ => Err("expected hub or clock".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub app_type: AppType,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub tick_interval: Duration,
    pub timezone: Tz,
    pub week_start: Weekday,
    pub kiosk_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".into(),
            app_type: AppType::Hub,
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(10),
            tick_interval: Duration::from_millis(1000),
            timezone: chrono_tz::UTC,
            week_start: Weekday::Sun,
            kiosk_idle_timeout: Duration::from_secs(120),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which is asked for each `TIME_TRACKING_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (key, value))
        };

        let api_base_url = match get("API_BASE_URL") {
            Some((key, value)) => parse_url(key, value)?,
            None => defaults.api_base_url,
        };

        Ok(Self {
            api_base_url,
            app_type: parse_or(get("APP_TYPE"), defaults.app_type, |v| v.parse())?,
            request_timeout: parse_or(get("REQUEST_TIMEOUT_SECS"), defaults.request_timeout, secs)?,
            poll_interval: parse_or(get("POLL_INTERVAL_SECS"), defaults.poll_interval, secs)?,
            tick_interval: parse_or(get("TICK_INTERVAL_MS"), defaults.tick_interval, millis)?,
            timezone: parse_or(get("TIMEZONE"), defaults.timezone, |v| {
                v.trim().parse::<Tz>().map_err(|e| e.to_string())
            })?,
            week_start: parse_or(get("WEEK_START"), defaults.week_start, |v| {
                v.trim()
                    .parse::<Weekday>()
                    .map_err(|_| "expected a weekday name".to_string())
            })?,
            kiosk_idle_timeout: parse_or(
                get("KIOSK_IDLE_TIMEOUT_SECS"),
                defaults.kiosk_idle_timeout,
                secs,
            )?,
        })
    }

    pub fn calendar(&self) -> WorkCalendar {
        WorkCalendar::new(self.timezone, self.week_start)
    }
}

fn parse_or<T>(
    raw: Option<(String, String)>,
    default: T,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some((key, value)) => parse(&value).map_err(|reason| ConfigError::Invalid {
            key,
            value,
            reason,
        }),
    }
}

fn positive(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("must be greater than zero".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn secs(value: &str) -> Result<Duration, String> {
    positive(value).map(Duration::from_secs)
}

fn millis(value: &str) -> Result<Duration, String> {
    positive(value).map(Duration::from_millis)
}

fn parse_url(key: String, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        Ok(_) => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected an http or https url".into(),
        }),
        Err(e) => Err(ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}
