//! Library configuration.
//!
//! Configuration is loaded from `BIBLIO_*` environment variables with
//! fallback to defaults, then split into the pool settings ([`DbConfig`])
//! and the engine settings ([`LoanPolicy`]).

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use biblio_core::{FinePolicy, LoanPolicy, Money, DEFAULT_LOAN_DAYS, MAX_LOAN_DAYS};
use biblio_core::fine::DEFAULT_DAILY_RATE_CENTS;

use crate::pool::DbConfig;

/// Library configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Email of the manager treated as administrator
    pub admin_email: String,

    /// Duration offered to callers when they do not pick one
    pub default_loan_days: i64,

    /// Longest loan accepted, in days
    pub max_loan_days: i64,

    /// Fine per started overdue day, in cents
    pub fine_daily_cents: i64,

    /// Ceiling on the fine of one loan, in cents
    pub fine_cap_cents: Option<i64>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            database_path: PathBuf::from("./biblio.db"),
            max_connections: 5,
            admin_email: "admin@biblio.local".to_string(),
            default_loan_days: DEFAULT_LOAN_DAYS,
            max_loan_days: MAX_LOAN_DAYS,
            fine_daily_cents: DEFAULT_DAILY_RATE_CENTS,
            fine_cap_cents: None,
        }
    }
}

impl LibraryConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LibraryConfig::default();

        let config = LibraryConfig {
            database_path: lookup("BIBLIO_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, "BIBLIO_MAX_CONNECTIONS", defaults.max_connections)?,

            admin_email: lookup("BIBLIO_ADMIN_EMAIL").unwrap_or(defaults.admin_email),

            default_loan_days: parse_or(
                &lookup,
                "BIBLIO_DEFAULT_LOAN_DAYS",
                defaults.default_loan_days,
            )?,

            max_loan_days: parse_or(&lookup, "BIBLIO_MAX_LOAN_DAYS", defaults.max_loan_days)?,

            fine_daily_cents: parse_or(
                &lookup,
                "BIBLIO_FINE_DAILY_CENTS",
                defaults.fine_daily_cents,
            )?,

            fine_cap_cents: match lookup("BIBLIO_FINE_CAP_CENTS") {
                Some(raw) => Some(parse("BIBLIO_FINE_CAP_CENTS", &raw)?),
                None => None,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("BIBLIO_MAX_CONNECTIONS".to_string()));
        }
        if self.max_loan_days < 0 {
            return Err(ConfigError::InvalidValue("BIBLIO_MAX_LOAN_DAYS".to_string()));
        }
        if !(0..=self.max_loan_days).contains(&self.default_loan_days) {
            return Err(ConfigError::InvalidValue("BIBLIO_DEFAULT_LOAN_DAYS".to_string()));
        }
        if self.fine_daily_cents < 0 {
            return Err(ConfigError::InvalidValue("BIBLIO_FINE_DAILY_CENTS".to_string()));
        }
        if matches!(self.fine_cap_cents, Some(cap) if cap < 0) {
            return Err(ConfigError::InvalidValue("BIBLIO_FINE_CAP_CENTS".to_string()));
        }
        Ok(())
    }

    /// Pool settings for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }

    /// Engine settings for [`crate::Database::loan_engine`].
    pub fn loan_policy(&self) -> LoanPolicy {
        let mut fine = FinePolicy::new(Money::from_cents(self.fine_daily_cents));
        if let Some(cap) = self.fine_cap_cents {
            fine = fine.with_cap(Money::from_cents(cap));
        }

        LoanPolicy {
            fine,
            max_duration_days: self.max_loan_days,
        }
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
