//! Connection configuration read from the environment.
//!
//! Values come from the process environment after an optional `.env` file has
//! been loaded by the binary. Unset keys fall back to local defaults; a port
//! that does not parse is a configuration error.

use crate::error::{Error, Result};

pub const DB_HOST_POSTGRES: &str = "DB_HOST_POSTGRES";
pub const DB_PORT_POSTGRES: &str = "DB_PORT_POSTGRES";
pub const DB_USER_POSTGRES: &str = "DB_USER_POSTGRES";
pub const DB_PASSWORD_POSTGRES: &str = "DB_PASSWORD_POSTGRES";
pub const DB_NAME_POSTGRES: &str = "DB_NAME_POSTGRES";
pub const DB_HOST_REDIS: &str = "DB_HOST_REDIS";
pub const DB_PORT_REDIS: &str = "DB_PORT_REDIS";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: u16 = 5432;
const DEFAULT_POSTGRES_USER: &str = "postgres";
const DEFAULT_POSTGRES_DB: &str = "postgres";
const DEFAULT_REDIS_PORT: u16 = 6379;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub postgres: PostgresConfig,
    pub redis: RedisConfig,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let port = |key: &str, default: u16| match lookup(key).filter(|v| !v.is_empty()) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("{key} is not a valid port: {raw:?}"))),
        };

        Ok(Self {
            postgres: PostgresConfig {
                host: string(DB_HOST_POSTGRES, DEFAULT_HOST),
                port: port(DB_PORT_POSTGRES, DEFAULT_POSTGRES_PORT)?,
                user: string(DB_USER_POSTGRES, DEFAULT_POSTGRES_USER),
                password: lookup(DB_PASSWORD_POSTGRES).unwrap_or_default(),
                dbname: string(DB_NAME_POSTGRES, DEFAULT_POSTGRES_DB),
            },
            redis: RedisConfig {
                host: string(DB_HOST_REDIS, DEFAULT_HOST),
                port: port(DB_PORT_REDIS, DEFAULT_REDIS_PORT)?,
            },
        })
    }
}
