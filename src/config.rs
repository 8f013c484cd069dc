//! Runtime configuration read from environment variables (after `.env` is loaded).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_LIMITER_RPS: f64 = 2.0;
pub const DEFAULT_LIMITER_BURST: u32 = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Per-client token bucket settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LimiterConfig {
    /// Sustained requests per second.
    pub rps: f64,
    pub burst: u32,
    pub enabled: bool,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            rps: DEFAULT_LIMITER_RPS,
            burst: DEFAULT_LIMITER_BURST,
            enabled: false,
        }
    }
}

/// Admin account created at startup when it does not exist yet.
#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub password: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("name", &self.name)
            .field("password", &"..")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub env: Environment,
    pub database: DatabaseConfig,
    pub limiter: LimiterConfig,
    pub admin: Option<AdminSeed>,
}

impl Config {
    /// Read every setting from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset and empty variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let env = parse_or(&get, "FILMOTEKA_ENV", Environment::Development)?;

        let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", "0"));
        }

        let rps: f64 = parse_or(&get, "LIMITER_RPS", DEFAULT_LIMITER_RPS)?;
        if !(rps.is_finite() && rps > 0.0) {
            return Err(invalid("LIMITER_RPS", &rps.to_string()));
        }
        let burst = parse_or(&get, "LIMITER_BURST", DEFAULT_LIMITER_BURST)?;
        if burst == 0 {
            return Err(invalid("LIMITER_BURST", "0"));
        }
        let enabled = match get("LIMITER_ENABLED") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| invalid("LIMITER_ENABLED", &v))?,
        };

        let admin = match (get("FILMOTEKA_ADMIN_NAME"), get("FILMOTEKA_ADMIN_PASSWORD")) {
            (Some(name), Some(password)) => Some(AdminSeed { name, password }),
            _ => None,
        };

        Ok(Self {
            port,
            env,
            database: DatabaseConfig { url, max_connections },
            limiter: LimiterConfig {
                rps,
                burst,
                enabled,
            },
            admin,
        })
    }

    /// Settings for running without a database, e.g. against the in-memory store.
    pub fn without_database(env: Environment, limiter: LimiterConfig) -> Self {
        Self {
            port: DEFAULT_PORT,
            env,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            limiter,
            admin: None,
        }
    }
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| invalid(var, &v)),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
