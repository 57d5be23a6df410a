//! Configuration management for the doks client and CLI
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::api::DEFAULT_API_URL;

/// Environment variable holding the API token
pub const TOKEN_ENV_VAR: &str = "DIGITALOCEAN_TOKEN";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// DigitalOcean API token (can also be set via DIGITALOCEAN_TOKEN env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Overall request timeout; no timeout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Custom User-Agent header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("Invalid api_url {}: {}", self.api_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("api_url must use http or https: {}", self.api_url);
        }

        if self.timeout_secs == Some(0) {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Get the API token from config or environment
    pub fn api_token(&self) -> anyhow::Result<String> {
        self.token
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "DigitalOcean API token not found. Set {} environment variable or specify in config",
                    TOKEN_ENV_VAR
                )
            })
    }

    /// Generate an example configuration file
    pub fn example() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            timeout_secs: Some(60),
            user_agent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::example();
        assert!(config.validate().is_ok());

        config.api_url = "ftp://api.digitalocean.com".to_string();
        assert!(config.validate().is_err());

        config.api_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ClientConfig {
            timeout_secs: Some(0),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_defaults() {
        let config = ClientConfig::from_yaml("token: abc\n").unwrap();
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.timeout_secs.is_none());
        assert_eq!(config.api_token().unwrap(), "abc");
    }

    #[test]
    fn test_example_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&ClientConfig::example()).unwrap();
        let config = ClientConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.timeout_secs, Some(60));
        assert!(!yaml.contains("token"));
    }
}
