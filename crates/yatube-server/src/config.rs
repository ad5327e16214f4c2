use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use yatube_feed::FeedSettings;
use yatube_feed::feed::{DEFAULT_CACHE_TTL, DEFAULT_PAGE_SIZE};

/// Server settings, read from `YATUBE_*` environment variables (a `.env`
/// file is loaded first if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub page_size: u32,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            db_path: try_load("YATUBE_DB_PATH", "yatube.db")?,
            host: try_load("YATUBE_HOST", "0.0.0.0")?,
            port: try_load("YATUBE_PORT", "8000")?,
            page_size: try_load("YATUBE_PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())?,
            cache_ttl: Duration::from_secs(try_load(
                "YATUBE_FEED_CACHE_TTL_SECS",
                &DEFAULT_CACHE_TTL.as_secs().to_string(),
            )?),
        })
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            page_size: self.page_size,
            cache_ttl: self.cache_ttl,
        }
    }
}

fn try_load<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_key_falls_back_to_default() {
        let port: u16 = try_load("YATUBE_TEST_NEVER_SET", "8000").unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn unparseable_value_names_the_key() {
        let err = try_load::<u16>("YATUBE_TEST_NEVER_SET", "eighty").unwrap_err();
        assert!(format!("{err:#}").contains("YATUBE_TEST_NEVER_SET"));
    }
}
