use chrono_tz::Tz;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::credentials::decrypt_token;
use crate::error::{Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://magicminute.online/api";
pub const DEFAULT_TIME_ZONE: &str = "Asia/Kolkata";
pub const DEFAULT_MARKER_STORE_PATH: &str = "attendance_markers.json";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub time_zone: Tz,
    pub marker_store_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_echo: bool,
    pub request_timeout: Duration,
    pub api_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset, like an empty line in .env
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = var("API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let tz_name = var("ATTENDANCE_TZ").unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());
        let time_zone: Tz = tz_name
            .parse()
            .map_err(|e| Error::Config(format!("ATTENDANCE_TZ '{}': {}", tz_name, e)))?;

        let marker_store_path =
            PathBuf::from(var("MARKER_STORE_PATH").unwrap_or_else(|| DEFAULT_MARKER_STORE_PATH.to_string()));
        let log_dir = PathBuf::from(var("LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()));

        let log_echo = match var("LOG_ECHO") {
            None => true,
            Some(v) => parse_bool(&v).ok_or_else(|| Error::Config(format!("LOG_ECHO '{}' is not a boolean", v)))?,
        };

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            Some(v) => {
                let secs: u64 = v
                    .parse()
                    .map_err(|_| Error::Config(format!("REQUEST_TIMEOUT_SECS '{}' is not a number", v)))?;
                if secs == 0 {
                    return Err(Error::Config("REQUEST_TIMEOUT_SECS must be positive".to_string()));
                }
                Duration::from_secs(secs)
            }
        };

        let api_token = match (var("AES_KEY"), var("AES_IV"), var("API_TOKEN_ENC")) {
            (Some(key_b64), Some(iv_b64), Some(enc_b64)) => Some(decrypt_token(&key_b64, &iv_b64, &enc_b64)?),
            _ => var("API_TOKEN"),
        };

        Ok(Config {
            api_base_url,
            time_zone,
            marker_store_path,
            log_dir,
            log_echo,
            request_timeout,
            api_token,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_map(&HashMap::new()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.time_zone, chrono_tz::Asia::Kolkata);
        assert_eq!(config.marker_store_path, PathBuf::from(DEFAULT_MARKER_STORE_PATH));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.log_echo);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = Config::from_map(&vars(&[("API_BASE_URL", "http://localhost:8000/api/")])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000/api");
    }

    #[test]
    fn test_unknown_time_zone_is_config_error() {
        let err = Config::from_map(&vars(&[("ATTENDANCE_TZ", "Mars/Olympus")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_or_garbage_timeout_rejected() {
        assert!(Config::from_map(&vars(&[("REQUEST_TIMEOUT_SECS", "0")])).is_err());
        assert!(Config::from_map(&vars(&[("REQUEST_TIMEOUT_SECS", "soon")])).is_err());
        let config = Config::from_map(&vars(&[("REQUEST_TIMEOUT_SECS", "5")])).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_plain_token_and_blank_values() {
        let config = Config::from_map(&vars(&[("API_TOKEN", "abc"), ("LOG_DIR", "  ")])).unwrap();
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.log_dir, PathBuf::from(DEFAULT_LOG_DIR));
    }

    #[test]
    fn test_log_echo_parsing() {
        let config = Config::from_map(&vars(&[("LOG_ECHO", "off")])).unwrap();
        assert!(!config.log_echo);
        assert!(Config::from_map(&vars(&[("LOG_ECHO", "maybe")])).is_err());
    }

    #[test]
    fn test_undecryptable_token_is_credentials_error() {
        let err = Config::from_map(&vars(&[
            ("AES_KEY", "c2hvcnQ="),
            ("AES_IV", "c2hvcnQ="),
            ("API_TOKEN_ENC", "c2hvcnQ="),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }
}
