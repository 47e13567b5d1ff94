use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_MODEL_PATH: &str = "assets/model.json";
const DEFAULT_FEATURE_DATA_PATH: &str = "assets/features.csv";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 60;

/// Environment-sourced settings, read once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub model_path: PathBuf,
    pub feature_data_path: PathBuf,
    pub connect_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set to a Postgres instance")?;

        let model_path = std::env::var("MODEL_PATH")
            .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
            .into();
        let feature_data_path = std::env::var("FEATURE_DATA_PATH")
            .unwrap_or_else(|_| DEFAULT_FEATURE_DATA_PATH.to_string())
            .into();

        let connect_timeout_secs = match std::env::var("DB_CONNECT_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("DB_CONNECT_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            model_path,
            feature_data_path,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env mutations never race another test.
    #[test]
    fn reads_settings_from_the_environment() {
        std::env::remove_var("DATABASE_URL");
        assert!(Config::from_env().is_err());

        std::env::set_var("DATABASE_URL", "postgres://localhost/app");
        std::env::remove_var("MODEL_PATH");
        std::env::remove_var("FEATURE_DATA_PATH");
        std::env::remove_var("DB_CONNECT_TIMEOUT_SECS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(
            config.feature_data_path,
            PathBuf::from(DEFAULT_FEATURE_DATA_PATH)
        );
        assert_eq!(
            config.connect_timeout,
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
        );

        std::env::set_var("DB_CONNECT_TIMEOUT_SECS", "nope");
        assert!(Config::from_env().is_err());

        std::env::set_var("DB_CONNECT_TIMEOUT_SECS", "5");
        let config = Config::from_env().unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }
}
