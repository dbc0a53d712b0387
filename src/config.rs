//! Configuration
//!
//! Settings are read from the environment (optionally seeded from a `.env`
//! file). Credentials are never compiled into the binary.

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::AgentRole;

pub const DEFAULT_BASE_URL: &str = "https://api.on-demand.io/chat/v1";
pub const DEFAULT_ENDPOINT_ID: &str = "predefined-openai-gpt4.1";
pub const DEFAULT_ORIGIN: &str = "https://gulfvalidate.app";
pub const DEFAULT_STORE_FILE: &str = "gulf_validate.json";

/// Settings for the session-based analysis service
#[derive(Clone)]
pub struct BackendConfig {
    pub api_key: String,
    pub base_url: String,
    pub endpoint_id: String,
    pub agent_ids: Vec<String>,
    pub reasoning_mode: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint_id: DEFAULT_ENDPOINT_ID.to_string(),
            agent_ids: AgentRole::default_agent_ids(),
            reasoning_mode: "flash".to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(90),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// Keeps the key out of logs and panic messages
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("endpoint_id", &self.endpoint_id)
            .field("agent_ids", &self.agent_ids.len())
            .field("reasoning_mode", &self.reasoning_mode)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` when no API key is configured; analysis then goes straight to the fallback
    pub backend: Option<BackendConfig>,
    pub fallback_url: Option<String>,
    pub fallback_timeout: Duration,
    pub store_path: PathBuf,
    pub share_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: None,
            fallback_url: None,
            fallback_timeout: Duration::from_secs(30),
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            share_origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = AppConfig::default();

        if let Some(api_key) = get("GULF_VALIDATE_API_KEY") {
            let mut backend = BackendConfig::new(api_key);
            if let Some(url) = get("GULF_VALIDATE_BASE_URL") {
                backend.base_url = url;
            }
            if let Some(endpoint) = get("GULF_VALIDATE_ENDPOINT_ID") {
                backend.endpoint_id = endpoint;
            }
            if let Some(ids) = get("GULF_VALIDATE_AGENT_IDS") {
                backend.agent_ids = ids
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            if let Some(secs) = get("GULF_VALIDATE_TIMEOUT_SECS") {
                let secs: u64 = secs
                    .parse()
                    .with_context(|| format!("GULF_VALIDATE_TIMEOUT_SECS is not a number: '{}'", secs))?;
                backend.timeout = Duration::from_secs(secs);
            }
            config.backend = Some(backend);
        }

        config.fallback_url = get("GULF_VALIDATE_FALLBACK_URL");
        if let Some(secs) = get("GULF_VALIDATE_FALLBACK_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("GULF_VALIDATE_FALLBACK_TIMEOUT_SECS is not a number: '{}'", secs))?;
            config.fallback_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get("GULF_VALIDATE_STORE") {
            config.store_path = PathBuf::from(path);
        }
        if let Some(origin) = get("GULF_VALIDATE_ORIGIN") {
            config.share_origin = origin.trim_end_matches('/').to_string();
        }

        Ok(config)
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
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.backend.is_none());
        assert!(config.fallback_url.is_none());
        assert_eq!(config.share_origin, DEFAULT_ORIGIN);
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_FILE));
    }

    #[test]
    fn test_backend_from_env() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GULF_VALIDATE_API_KEY", "secret-key"),
            ("GULF_VALIDATE_AGENT_IDS", "agent-1, agent-2,,"),
            ("GULF_VALIDATE_TIMEOUT_SECS", "15"),
            ("GULF_VALIDATE_FALLBACK_URL", "http://localhost:8000/analyze"),
            ("GULF_VALIDATE_ORIGIN", "http://localhost:5173/"),
        ]))
        .unwrap();

        let backend = config.backend.unwrap();
        assert_eq!(backend.api_key, "secret-key");
        assert_eq!(backend.agent_ids, vec!["agent-1", "agent-2"]);
        assert_eq!(backend.timeout, Duration::from_secs(15));
        assert_eq!(backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.fallback_url.as_deref(), Some("http://localhost:8000/analyze"));
        assert_eq!(config.share_origin, "http://localhost:5173");
    }

    #[test]
    fn test_blank_key_means_no_backend() {
        let config = AppConfig::from_lookup(lookup(&[("GULF_VALIDATE_API_KEY", "  ")])).unwrap();
        assert!(config.backend.is_none());
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        let result = AppConfig::from_lookup(lookup(&[
            ("GULF_VALIDATE_API_KEY", "k"),
            ("GULF_VALIDATE_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let backend = BackendConfig::new("super-secret");
        let printed = format!("{:?}", backend);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
