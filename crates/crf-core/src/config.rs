//! Configuration types and loading
//!
//! Defaults are overridden from environment variables (after `.env` has been
//! loaded by the server binary).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Canvas (LMS) connection settings
    pub canvas: CanvasConfig,

    /// Term overrides
    pub terms: TermConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Log output configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub pool_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

/// Canvas connection settings
///
/// `debug` selects the test instance; otherwise production is used.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CanvasConfig {
    pub debug: bool,
    pub test_url: String,
    #[serde(skip_serializing)]
    pub test_key: String,
    pub prod_url: String,
    #[serde(skip_serializing)]
    pub prod_key: String,
    /// Root account under which courses, terms and sub-accounts live
    pub main_account_id: i64,
    pub request_timeout_seconds: u64,
}

impl CanvasConfig {
    pub fn base_url(&self) -> &str {
        if self.debug {
            &self.test_url
        } else {
            &self.prod_url
        }
    }

    pub fn api_key(&self) -> &str {
        if self.debug {
            &self.test_key
        } else {
            &self.prod_key
        }
    }
}

/// Current/next term codes (e.g. `202330`); derived from the date when unset
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TermConfig {
    pub current: Option<i32>,
    pub next: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Header set by the SSO proxy carrying the authenticated username
    pub remote_user_header: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for the daily-rolling log file; `None` logs to console only
    pub log_dir: Option<String>,
    pub file_prefix: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgres://course_request_form@localhost/course_request_form".to_string(),
                pool_size: 10,
                pool_timeout_seconds: 5,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                request_timeout_seconds: 60,
            },
            canvas: CanvasConfig {
                debug: true,
                test_url: "https://upenn.test.instructure.com".to_string(),
                test_key: String::new(),
                prod_url: "https://canvas.upenn.edu".to_string(),
                prod_key: String::new(),
                main_account_id: 96678,
                request_timeout_seconds: 30,
            },
            terms: TermConfig::default(),
            auth: AuthConfig {
                remote_user_header: "x-remote-user".to_string(),
            },
            logging: LoggingConfig {
                log_dir: Some("logs".to_string()),
                file_prefix: "course_request_form.log".to_string(),
                json: false,
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Database
        if let Some(url) = lookup("DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(size) = lookup("DATABASE_POOL_SIZE") {
            config.database.pool_size = parse_value("DATABASE_POOL_SIZE", &size)?;
        }

        // Server
        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.server.port = parse_value("PORT", &port)?;
        }

        // Canvas
        if let Some(debug) = lookup("DEBUG") {
            config.canvas.debug = parse_bool(&debug);
        }
        if let Some(url) = lookup("CANVAS_TEST_URL") {
            config.canvas.test_url = url;
        }
        if let Some(key) = lookup("CANVAS_TEST_KEY") {
            config.canvas.test_key = key;
        }
        if let Some(url) = lookup("CANVAS_PROD_URL") {
            config.canvas.prod_url = url;
        }
        if let Some(key) = lookup("CANVAS_PROD_KEY") {
            config.canvas.prod_key = key;
        }
        if let Some(id) = lookup("CANVAS_MAIN_ACCOUNT_ID") {
            config.canvas.main_account_id = parse_value("CANVAS_MAIN_ACCOUNT_ID", &id)?;
        }
        if !config.canvas.debug && config.canvas.prod_key.is_empty() {
            return Err(ConfigError::MissingEnvVar("CANVAS_PROD_KEY".to_string()));
        }

        // Terms
        if let Some(term) = lookup("CURRENT_TERM") {
            config.terms.current = Some(parse_value("CURRENT_TERM", &term)?);
        }
        if let Some(term) = lookup("NEXT_TERM") {
            config.terms.next = Some(parse_value("NEXT_TERM", &term)?);
        }

        // Auth
        if let Some(header) = lookup("REMOTE_USER_HEADER") {
            config.auth.remote_user_header = header.to_ascii_lowercase();
        }

        // Logging
        if let Some(dir) = lookup("LOG_DIR") {
            config.logging.log_dir = if dir.is_empty() { None } else { Some(dir) };
        }
        if let Some(json) = lookup("LOG_JSON") {
            config.logging.json = parse_bool(&json);
        }

        Ok(config)
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.canvas.main_account_id, 96678);
        assert!(config.canvas.debug);
        assert_eq!(config.canvas.base_url(), "https://upenn.test.instructure.com");
    }

    #[test]
    fn test_prod_selection() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DEBUG", "false"),
            ("CANVAS_PROD_URL", "https://canvas.example.edu"),
            ("CANVAS_PROD_KEY", "secret"),
            ("CANVAS_TEST_KEY", "test-secret"),
        ]))
        .unwrap();

        assert!(!config.canvas.debug);
        assert_eq!(config.canvas.base_url(), "https://canvas.example.edu");
        assert_eq!(config.canvas.api_key(), "secret");
    }

    #[test]
    fn test_prod_requires_key() {
        let result = AppConfig::from_lookup(lookup(&[("DEBUG", "0")]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CANVAS_PROD_KEY"));
    }

    #[test]
    fn test_term_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CURRENT_TERM", "202330"),
            ("NEXT_TERM", "202410"),
        ]))
        .unwrap();
        assert_eq!(config.terms.current, Some(202330));
        assert_eq!(config.terms.next, Some(202410));
    }

    #[test]
    fn test_invalid_port() {
        let result = AppConfig::from_lookup(lookup(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { ref key, .. }) if key == "PORT"));
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig::default();
        let addr = config.server_addr();
        assert_eq!(addr.port(), 8000);
    }
}
