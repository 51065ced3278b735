use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
#[error("Invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub analysis_delay: Duration,
    pub contact_delay: Duration,
    pub max_upload_bytes: usize,
    pub template_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            env::var(key)
                .map_err(|_| {
                    warn!("Environment variable {key} not found, using default");
                })
                .ok()
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "RUST_PORT", "5000")?,
            analysis_delay: Duration::from_millis(try_load(&lookup, "ANALYSIS_DELAY_MS", "600")?),
            contact_delay: Duration::from_millis(try_load(&lookup, "CONTACT_DELAY_MS", "200")?),
            max_upload_bytes: try_load(&lookup, "MAX_UPLOAD_BYTES", "104857600")?,
            template_dir: try_load(&lookup, "TEMPLATE_DIR", "templates")?,
            static_dir: try_load(&lookup, "STATIC_DIR", "static")?,
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&'static str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");

        ConfigError {
            key,
            reason: e.to_string(),
            value,
        }
    })
}
