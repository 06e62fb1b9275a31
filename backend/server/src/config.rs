use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Result, anyhow};
use tracing::info;

pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub busy_timeout: Duration,
    pub cors_max_age: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "8000")?,
            database_path: try_load("DATABASE_PATH", "food.db")?,
            busy_timeout: Duration::from_millis(try_load("BUSY_TIMEOUT_MS", "5000")?),
            cors_max_age: Duration::from_secs(try_load("CORS_MAX_AGE_SECS", "3600")?),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {value:?}: {e}"))
}
