//! Gateway configuration loaded from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::Level;
use typed_builder::TypedBuilder;

use crate::client::DEFAULT_BASE_URL;
use crate::error::ConfigError;

/// Default model used when `GEMINI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default request body limit for uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Runtime settings for the gateway.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct GatewayConfig {
    /// Gemini API key
    #[builder(setter(into))]
    pub api_key: String,
    /// Model identifier
    #[builder(setter(into), default = DEFAULT_MODEL.to_string())]
    pub model: String,
    /// Gemini API endpoint
    #[builder(setter(into), default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    /// Address to bind
    #[builder(setter(into), default = "0.0.0.0".to_string())]
    pub host: String,
    /// Port to bind
    #[builder(default = DEFAULT_PORT)]
    pub port: u16,
    /// Directory receiving temporary uploads
    #[builder(setter(into), default = env::temp_dir().join("gemini-gateway-uploads"))]
    pub upload_dir: PathBuf,
    /// Largest accepted request body
    #[builder(default = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
    /// Total timeout for each backend call
    #[builder(default, setter(strip_option))]
    pub request_timeout: Option<Duration>,
    /// Log verbosity
    #[builder(default = Level::INFO)]
    pub log_level: Level,
    /// Emit logs as JSON lines
    #[builder(default = false)]
    pub log_json: bool,
}

impl GatewayConfig {
    /// Reads the configuration from environment variables.
    ///
    /// `GOOGLE_API_KEY` is required; everything else has a default.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("GOOGLE_API_KEY").ok_or(ConfigError::Missing {
            name: "GOOGLE_API_KEY",
        })?;

        let mut config = Self::builder().api_key(api_key).build();
        if let Some(model) = get("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = get("GOOGLE_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(dir) = get("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(port) = parse("PORT", get("PORT"))? {
            config.port = port;
        }
        if let Some(limit) = parse("MAX_UPLOAD_BYTES", get("MAX_UPLOAD_BYTES"))? {
            config.max_upload_bytes = limit;
        }
        if let Some(secs) = parse::<u64>("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"))? {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(level) = parse("LOG_LEVEL", get("LOG_LEVEL"))? {
            config.log_level = level;
        }
        if let Some(json) = parse("LOG_JSON", get("LOG_JSON"))? {
            config.log_json = json;
        }

        Ok(config)
    }

    /// Socket address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = format!("{}:{}", self.host, self.port);
        value.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: "HOST",
            value: self.host.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse<T>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_with_only_api_key() {
        let config = GatewayConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "k")])).unwrap();

        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn api_key_is_required() {
        let err = GatewayConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "GOOGLE_API_KEY" }));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("REQUEST_TIMEOUT_SECS", "30"),
            ("LOG_LEVEL", "debug"),
            ("LOG_JSON", "true"),
            ("UPLOAD_DIR", "/var/tmp/uploads"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.log_level, Level::DEBUG);
        assert!(config.log_json);
        assert_eq!(config.upload_dir, PathBuf::from("/var/tmp/uploads"));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "k"), ("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
