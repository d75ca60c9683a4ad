use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "ResourceDirectory/1.0";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub nominatim_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            nominatim_url: env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.to_string()),
            geocoder_user_agent: env::var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_USER_AGENT.to_string()),
            geocoder_timeout_secs: env::var("GEOCODER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("GEOCODER_TIMEOUT_SECS must be a valid number")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env mutations don't race other tests in this module.
    #[test]
    fn reads_required_and_defaulted_values() {
        env::set_var("DATABASE_URL", "postgres://localhost/directory_test");
        env::remove_var("NOMINATIM_URL");
        env::remove_var("GEOCODER_TIMEOUT_SECS");
        let config = Config::from_env().unwrap();
        assert_eq!(config.database_url, "postgres://localhost/directory_test");
        assert_eq!(config.nominatim_url, DEFAULT_NOMINATIM_URL);
        assert_eq!(config.geocoder_timeout_secs, 10);

        env::set_var("GEOCODER_TIMEOUT_SECS", "soon");
        assert!(Config::from_env().is_err());
        env::remove_var("GEOCODER_TIMEOUT_SECS");
    }
}
