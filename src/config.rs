use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use tracing::info;

use crate::models::PublicationState;

/// Server settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Unset means demo mode with in-memory listings
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
    /// Publication states hidden from every public endpoint
    pub excluded_states: Vec<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: None,
            max_connections: 5,
            run_migrations: false,
            excluded_states: PublicationState::hidden(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let excluded_states = match var("EXCLUDED_PUBLICATION_STATES") {
            Some(raw) => parse_state_list(&raw)?,
            None => defaults.excluded_states,
        };

        Ok(Self {
            port: parse_or("PORT", defaults.port)?,
            database_url: var("DATABASE_URL"),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            run_migrations: parse_or("RUN_MIGRATIONS", defaults.run_migrations)?,
            excluded_states,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + std::fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

/// Strict comma-separated id list; any unparseable entry is an error
fn parse_state_list(raw: &str) -> Result<Vec<i32>> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .with_context(|| format!("Invalid EXCLUDED_PUBLICATION_STATES entry: {part:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hide_drafts_sold_and_rented() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.excluded_states, vec![2, 3, 4]);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn unset_key_yields_default() {
        let port: u16 = parse_or("HOUSING_PORTAL_TEST_UNSET_KEY", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn excluded_states_are_parsed_strictly() {
        assert_eq!(parse_state_list(" 2, 3,4 ").unwrap(), vec![2, 3, 4]);

        for bad in ["2;3;4", "x", "2,,3", "2,drafts"] {
            assert!(parse_state_list(bad).is_err(), "{bad:?} was accepted");
        }
    }

    #[test]
    fn malformed_exclusions_fail_startup() {
        env::set_var("EXCLUDED_PUBLICATION_STATES", "2;3;4");
        let result = Config::from_env();
        env::remove_var("EXCLUDED_PUBLICATION_STATES");

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("EXCLUDED_PUBLICATION_STATES"));
    }
}
