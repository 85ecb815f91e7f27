//! Startup configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. They are read once at startup.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Environment variable holding the model API key.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Environment variable holding the store location.
pub const DB_PATH_VAR: &str = "PHARMACY_DB";
/// Environment variable overriding the Gemini model name.
pub const MODEL_VAR: &str = "GEMINI_MODEL";
/// Store location used when none is configured.
pub const DEFAULT_DB_PATH: &str = "pharmacy.db";

/// Configuration errors. All of them are fatal at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} in environment variables.")]
    MissingCredential(&'static str),
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// SQLite store location
    pub database_path: PathBuf,
    /// Model access credential
    pub api_key: String,
    /// Gemini model override
    pub gemini_model: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .finish()
    }
}

impl Config {
    /// Load from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR).ok_or(ConfigError::MissingCredential(API_KEY_VAR))?;
        let database_path = non_empty(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        let gemini_model = non_empty(MODEL_VAR);

        Ok(Self {
            database_path,
            api_key,
            gemini_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "secret")])).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.database_path, PathBuf::from("pharmacy.db"));
        assert_eq!(config.gemini_model, None);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "secret"),
            ("PHARMACY_DB", "/var/lib/pharmacy/store.db"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/pharmacy/store.db")
        );
        assert_eq!(config.gemini_model.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingCredential("GOOGLE_API_KEY")
        );
        assert!(Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
