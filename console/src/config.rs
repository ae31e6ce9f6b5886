//! Console configuration loaded via OrthoConfig.
//!
//! Values come from `BLOODBANK_*` environment variables or a config file;
//! every field is optional and falls back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::bootstrap::RetryPolicy;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_STORAGE_DIR: &str = ".bloodbank-console";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The API base URL did not parse or is not http(s).
    #[error("invalid API base URL {value}: {reason}")]
    InvalidBaseUrl {
        /// Configured value.
        value: String,
        /// Why it was refused.
        reason: String,
    },
}

/// Configuration values for the console front end.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOODBANK")]
pub struct ConsoleSettings {
    /// Backend API base, for example `http://localhost:5000/api`.
    pub api_base_url: Option<String>,
    /// Directory holding the persisted token.
    pub storage_dir: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Profile retries after the first attempt.
    pub max_retries: Option<u32>,
    /// User agent sent to the backend.
    pub user_agent: Option<String>,
    /// Emit JSON log lines instead of human-readable ones.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

impl ConsoleSettings {
    /// Parsed API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] for unparsable or non-HTTP
    /// values.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);
        let url = Url::parse(raw).map_err(|error| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            reason: error.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SettingsError::InvalidBaseUrl {
                value: raw.to_owned(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(url)
    }

    /// Token storage directory, falling back to `.bloodbank-console`.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    /// Per-request timeout; zero is raised to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Bootstrap retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            ..defaults
        }
    }

    /// Configured user agent, if overridden.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent
            .as_deref()
            .map(str::trim)
            .filter(|agent| !agent.is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for console configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "BLOODBANK_API_BASE_URL",
        "BLOODBANK_STORAGE_DIR",
        "BLOODBANK_REQUEST_TIMEOUT_SECS",
        "BLOODBANK_MAX_RETRIES",
        "BLOODBANK_USER_AGENT",
        "BLOODBANK_LOG_JSON",
    ];

    fn load_from_empty_args() -> ConsoleSettings {
        ConsoleSettings::load_from_iter([OsString::from("bloodbank-console")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("default url").as_str(),
            "http://localhost:5000/api"
        );
        assert_eq!(settings.storage_dir(), PathBuf::from(DEFAULT_STORAGE_DIR));
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
        assert_eq!(settings.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.user_agent(), None);
        assert!(!settings.log_json);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "BLOODBANK_API_BASE_URL",
                Some("https://blood.example.org/api".to_owned()),
            ),
            ("BLOODBANK_STORAGE_DIR", Some("/tmp/bloodbank".to_owned())),
            ("BLOODBANK_REQUEST_TIMEOUT_SECS", Some("0".to_owned())),
            ("BLOODBANK_MAX_RETRIES", Some("1".to_owned())),
            ("BLOODBANK_USER_AGENT", Some("ops-console/2".to_owned())),
            ("BLOODBANK_LOG_JSON", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("url").host_str(),
            Some("blood.example.org")
        );
        assert_eq!(settings.storage_dir(), PathBuf::from("/tmp/bloodbank"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
        assert_eq!(settings.retry_policy().max_retries, 1);
        assert_eq!(settings.user_agent(), Some("ops-console/2"));
        assert!(settings.log_json);
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://files.example.org/api")]
    fn invalid_base_urls_are_refused(#[case] raw: &str) {
        let _guard = lock_env([("BLOODBANK_API_BASE_URL", Some(raw.to_owned()))]);
        let settings = load_from_empty_args();
        assert!(matches!(
            settings.api_base_url(),
            Err(SettingsError::InvalidBaseUrl { .. })
        ));
    }
}
