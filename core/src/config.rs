//! Client configuration.
//!
//! Credentials and endpoint settings are an explicit value handed to
//! `Client::new`; nothing is read from process-wide state after that.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "https://api.razorpay.com";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_KEY_ID: &str = "RAZORPAY_KEY_ID";
pub const ENV_KEY_SECRET: &str = "RAZORPAY_KEY_SECRET";
pub const ENV_API_HOST: &str = "RAZORPAY_API_HOST";
pub const ENV_TIMEOUT_SECS: &str = "RAZORPAY_TIMEOUT_SECS";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub key_id: String,
    pub key_secret: String,
    pub host: String,
    pub api_version: String,
    /// Upper bound for a single request on the default transport.
    pub timeout: Duration,
}

impl Config {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            host: DEFAULT_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a config from `RAZORPAY_KEY_ID` / `RAZORPAY_KEY_SECRET`, with
    /// optional `RAZORPAY_API_HOST` and `RAZORPAY_TIMEOUT_SECS` overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let key_id = lookup(ENV_KEY_ID)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config(format!("{ENV_KEY_ID} is not set")))?;
        let key_secret = lookup(ENV_KEY_SECRET)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config(format!("{ENV_KEY_SECRET} is not set")))?;

        let mut config = Self::new(key_id, key_secret);
        if let Some(host) = lookup(ENV_API_HOST).filter(|v| !v.is_empty()) {
            config = config.with_host(host);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_TIMEOUT_SECS} is not a number: {raw}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into().trim_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// The secret stays out of logs and panic messages.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("host", &self.host)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
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
    fn defaults() {
        let config = Config::new("rzp_test_key", "secret");
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn host_and_version_are_normalised() {
        let config = Config::new("k", "s")
            .with_host("http://localhost:3000/")
            .with_api_version("/v2/");
        assert_eq!(config.host, "http://localhost:3000");
        assert_eq!(config.api_version, "v2");
    }

    #[test]
    fn from_env_requires_credentials() {
        let err = Config::from_lookup(lookup(&[(ENV_KEY_ID, "k")])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains(ENV_KEY_SECRET)));

        let err = Config::from_lookup(lookup(&[(ENV_KEY_ID, ""), (ENV_KEY_SECRET, "s")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains(ENV_KEY_ID)));
    }

    #[test]
    fn from_env_applies_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_KEY_ID, "k"),
            (ENV_KEY_SECRET, "s"),
            (ENV_API_HOST, "http://127.0.0.1:9000/"),
            (ENV_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();
        assert_eq!(config.host, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_env_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup(&[
            (ENV_KEY_ID, "k"),
            (ENV_KEY_SECRET, "s"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", Config::new("rzp_test_key", "super-secret"));
        assert!(rendered.contains("rzp_test_key"));
        assert!(!rendered.contains("super-secret"));
    }
}
