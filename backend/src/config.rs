//! Runtime configuration, read from environment variables (and an optional
//! `.env` file loaded by the binary).

use std::net::SocketAddr;
use thiserror::Error;

use crate::domain::report_service::DEFAULT_REPORT_DAYS;
use crate::domain::user_service::DEFAULT_MIN_AGE;
use crate::domain::SiteClock;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite connection URL (default: `sqlite:makerspace.db`).
    pub database_url: String,
    /// Listen address (default: `127.0.0.1:3000`).
    pub bind_addr: SocketAddr,
    /// Origin allowed to call the API from a browser (default: `http://localhost:8080`).
    pub cors_origin: String,
    /// Site UTC offset in whole hours (default: `8`, Asia/Manila).
    pub site_utc_offset_hours: i32,
    /// Youngest age accepted at registration (default: `5`).
    pub min_registration_age: i32,
    /// Length of the dashboard's default window in days (default: `30`).
    pub report_default_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:makerspace.db".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_origin: "http://localhost:8080".to_string(),
            site_utc_offset_hours: 8,
            min_registration_age: DEFAULT_MIN_AGE,
            report_default_days: DEFAULT_REPORT_DAYS,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `DATABASE_URL`          | `sqlite:makerspace.db`   |
    /// | `BIND_ADDR`             | `127.0.0.1:3000`         |
    /// | `CORS_ORIGIN`           | `http://localhost:8080`  |
    /// | `SITE_UTC_OFFSET_HOURS` | `8`                      |
    /// | `MIN_REGISTRATION_AGE`  | `5`                      |
    /// | `REPORT_DEFAULT_DAYS`   | `30`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any key lookup. Unset or blank keys take the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let config = Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parse_or("BIND_ADDR", get("BIND_ADDR"), defaults.bind_addr)?,
            cors_origin: get("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            site_utc_offset_hours: parse_or(
                "SITE_UTC_OFFSET_HOURS",
                get("SITE_UTC_OFFSET_HOURS"),
                defaults.site_utc_offset_hours,
            )?,
            min_registration_age: parse_or(
                "MIN_REGISTRATION_AGE",
                get("MIN_REGISTRATION_AGE"),
                defaults.min_registration_age,
            )?,
            report_default_days: parse_or(
                "REPORT_DEFAULT_DAYS",
                get("REPORT_DEFAULT_DAYS"),
                defaults.report_default_days,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// A system clock in the configured site offset
    pub fn site_clock(&self) -> Result<SiteClock, ConfigError> {
        SiteClock::from_utc_offset_hours(self.site_utc_offset_hours).ok_or_else(|| {
            invalid(
                "SITE_UTC_OFFSET_HOURS",
                self.site_utc_offset_hours,
                "must be between -23 and 23",
            )
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.site_clock()?;
        if self.min_registration_age < 0 {
            return Err(invalid(
                "MIN_REGISTRATION_AGE",
                self.min_registration_age,
                "must not be negative",
            ));
        }
        if self.report_default_days < 0 {
            return Err(invalid(
                "REPORT_DEFAULT_DAYS",
                self.report_default_days,
                "must not be negative",
            ));
        }
        Ok(())
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn invalid(name: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.site_clock().unwrap().offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "0.0.0.0:8000"),
            ("SITE_UTC_OFFSET_HOURS", "-5"),
            ("MIN_REGISTRATION_AGE", "7"),
            ("REPORT_DEFAULT_DAYS", " 14 "),
            ("CORS_ORIGIN", ""),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.site_utc_offset_hours, -5);
        assert_eq!(config.min_registration_age, 7);
        assert_eq!(config.report_default_days, 14);
        assert_eq!(config.cors_origin, "http://localhost:8080");
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));

        let err = AppConfig::from_lookup(lookup(&[("SITE_UTC_OFFSET_HOURS", "30")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SITE_UTC_OFFSET_HOURS", .. }));

        let err = AppConfig::from_lookup(lookup(&[("MIN_REGISTRATION_AGE", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MIN_REGISTRATION_AGE", .. }));
    }
}
