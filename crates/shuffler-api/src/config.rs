//! Server configuration from environment variables.
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `HOST` | `0.0.0.0` | bind address |
//! | `PORT` | `3000` | bind port |
//! | `SHUFFLER_POOL` | `10,20,30` | initial pool; empty string for an empty pool |
//! | `SHUFFLER_GUARD` | `ignore` | `ignore` or `strict` |
//! | `SHUFFLER_PRIZES` | none | prize catalog, e.g. `10=Bicycle,20=Phone` |
//! | `SHUFFLER_SHUFFLE_DELAY_MS` | `600` | shuffle visual delay |
//! | `SHUFFLER_REVEAL_MS` | `2000,3500,5000` | reveal offsets for third, second, first |
//! | `SHUFFLER_FLICKER_MS` | `60,30` | flicker base period and per-slot step |

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use shuffler_engine::domain::config::{EngineConfig, GuardPolicy};

use crate::error::AppError;

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Engine configuration.
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is malformed or the
    /// resulting engine configuration is inconsistent.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is malformed or the
    /// resulting engine configuration is inconsistent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };

        let mut engine = EngineConfig::default();
        if let Some(raw) = lookup("SHUFFLER_POOL") {
            engine.initial_pool = parse_pool(&raw)?;
        }
        if let Some(raw) = lookup("SHUFFLER_GUARD") {
            engine.guard = parse_guard(&raw)?;
        }
        if let Some(raw) = lookup("SHUFFLER_PRIZES") {
            engine.prize_names = parse_prizes(&raw)?;
        }
        if let Some(raw) = lookup("SHUFFLER_SHUFFLE_DELAY_MS") {
            engine.timing.shuffle_delay = parse_millis("SHUFFLER_SHUFFLE_DELAY_MS", &raw)?;
        }
        if let Some(raw) = lookup("SHUFFLER_REVEAL_MS") {
            let [third, second, first] = parse_millis_list::<3>("SHUFFLER_REVEAL_MS", &raw)?;
            engine.timing.reveal_third = third;
            engine.timing.reveal_second = second;
            engine.timing.reveal_first = first;
        }
        if let Some(raw) = lookup("SHUFFLER_FLICKER_MS") {
            let [base, step] = parse_millis_list::<2>("SHUFFLER_FLICKER_MS", &raw)?;
            engine.timing.flicker_base = base;
            engine.timing.flicker_step = step;
        }

        engine
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self { host, port, engine })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

/// Parses a comma-separated list of integers. An empty string is an empty
/// pool.
///
/// # Errors
///
/// Returns `AppError::Config` naming the first entry that is not an integer.
pub fn parse_pool(raw: &str) -> Result<Vec<i64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|entry| {
            let entry = entry.trim();
            entry
                .parse()
                .map_err(|e| AppError::Config(format!("SHUFFLER_POOL entry {entry:?}: {e}")))
        })
        .collect()
}

fn parse_guard(raw: &str) -> Result<GuardPolicy, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ignore" => Ok(GuardPolicy::Ignore),
        "strict" => Ok(GuardPolicy::Strict),
        other => Err(AppError::Config(format!(
            "SHUFFLER_GUARD must be `ignore` or `strict`, got {other:?}"
        ))),
    }
}

/// Parses a `number=name` catalog separated by commas.
///
/// # Errors
///
/// Returns `AppError::Config` if an entry has no `=` or a non-integer key.
pub fn parse_prizes(raw: &str) -> Result<BTreeMap<i64, String>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (number, name) = entry.split_once('=').ok_or_else(|| {
                AppError::Config(format!("SHUFFLER_PRIZES entry {entry:?} must be number=name"))
            })?;
            let number: i64 = number.trim().parse().map_err(|e| {
                AppError::Config(format!("SHUFFLER_PRIZES entry {entry:?}: {e}"))
            })?;
            Ok((number, name.trim().to_owned()))
        })
        .collect()
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration, AppError> {
    raw.trim()
        .parse()
        .map(Duration::from_millis)
        .map_err(|e| AppError::Config(format!("{key} must be milliseconds: {e}")))
}

fn parse_millis_list<const N: usize>(key: &str, raw: &str) -> Result<[Duration; N], AppError> {
    let values = raw
        .split(',')
        .map(|entry| parse_millis(key, entry))
        .collect::<Result<Vec<_>, _>>()?;
    values.try_into().map_err(|values: Vec<Duration>| {
        AppError::Config(format!(
            "{key} expects {N} comma-separated values, got {}",
            values.len()
        ))
    })
}
