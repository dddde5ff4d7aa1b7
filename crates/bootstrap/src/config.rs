use std::time::Duration;

use config::{Config, ConfigError, Environment};
use github::GithubConfig;
use relay::{RelayError, RelaySettings};
use serde::Deserialize;

/// Process-wide configuration, read once at cold start.
///
/// Every field except `aws_region` comes from a `RELAY_`-prefixed variable;
/// `aws_region` comes from `AWS_REGION`, which Lambda always sets.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Fallback filter when `RUST_LOG` is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Region used in console deep links
    #[serde(default)]
    pub aws_region: String,

    // GitHub configuration
    /// SSM parameter holding the GitHub token
    #[serde(default = "default_github_token_parameter")]
    pub github_token_parameter: String,

    /// GitHub API root
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Timeout for the status POST in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    // OpenTelemetry configuration
    /// OpenTelemetry OTLP endpoint (gRPC)
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    /// Enable OpenTelemetry export
    #[serde(default)]
    pub otel_enabled: bool,

    /// Service name for OpenTelemetry resource
    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_github_token_parameter() -> String {
    "/demo-app/GITHUB_TOKEN".to_string()
}

fn default_github_api_url() -> String {
    github::DEFAULT_API_BASE.to_string()
}

fn default_http_timeout_secs() -> u64 {
    github::DEFAULT_TIMEOUT.as_secs()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "codepipeline-github-status".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("RELAY").try_parsing(true))
            .set_override_option("aws_region", std::env::var("AWS_REGION").ok())?
            .build()?
            .try_deserialize()
    }

    /// Rejects values the relay cannot run with.
    pub fn validate(&self) -> Result<(), RelayError> {
        let problem = if self.aws_region.is_empty() {
            Some("AWS_REGION is not set")
        } else if self.github_token_parameter.is_empty() {
            Some("RELAY_GITHUB_TOKEN_PARAMETER is empty")
        } else if self.github_api_url.is_empty() {
            Some("RELAY_GITHUB_API_URL is empty")
        } else if self.http_timeout_secs == 0 {
            Some("RELAY_HTTP_TIMEOUT_SECS must be greater than zero")
        } else if self.otel_enabled && self.otel_endpoint.is_empty() {
            Some("RELAY_OTEL_ENDPOINT is empty but export is enabled")
        } else {
            None
        };

        match problem {
            Some(message) => Err(RelayError::Configuration {
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            region: self.aws_region.clone(),
            token_parameter: self.github_token_parameter.clone(),
        }
    }

    pub fn github_config(&self) -> GithubConfig {
        GithubConfig {
            api_base: self.github_api_url.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure tests run serially and don't interfere with each other
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "AWS_REGION",
        "RELAY_LOG_LEVEL",
        "RELAY_GITHUB_TOKEN_PARAMETER",
        "RELAY_GITHUB_API_URL",
        "RELAY_HTTP_TIMEOUT_SECS",
        "RELAY_OTEL_ENABLED",
        "RELAY_OTEL_ENDPOINT",
        "RELAY_OTEL_SERVICE_NAME",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("AWS_REGION", "eu-west-1");

        let config = ServiceConfig::from_env().unwrap();

        assert_eq!(config.aws_region, "eu-west-1");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.github_token_parameter, "/demo-app/GITHUB_TOKEN");
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.http_timeout_secs, 10);
        assert!(!config.otel_enabled);
        assert!(config.validate().is_ok());
        clear_env();
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("AWS_REGION", "us-east-2");
        std::env::set_var("RELAY_GITHUB_TOKEN_PARAMETER", "/ci/github-token");
        std::env::set_var("RELAY_GITHUB_API_URL", "https://ghe.example.com/api/v3");
        std::env::set_var("RELAY_HTTP_TIMEOUT_SECS", "3");
        std::env::set_var("RELAY_OTEL_ENABLED", "true");

        let config = ServiceConfig::from_env().unwrap();

        assert_eq!(
            config.relay_settings(),
            RelaySettings {
                region: "us-east-2".to_string(),
                token_parameter: "/ci/github-token".to_string(),
            }
        );
        assert_eq!(
            config.github_config(),
            GithubConfig {
                api_base: "https://ghe.example.com/api/v3".to_string(),
                timeout: Duration::from_secs(3),
            }
        );
        assert!(config.otel_enabled);
        clear_env();
    }

    #[test]
    fn test_missing_region_is_rejected() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();

        let config = ServiceConfig::from_env().unwrap();

        assert!(matches!(
            config.validate(),
            Err(RelayError::Configuration { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("AWS_REGION", "eu-west-1");
        std::env::set_var("RELAY_HTTP_TIMEOUT_SECS", "0");

        let config = ServiceConfig::from_env().unwrap();

        assert!(config.validate().is_err());
        clear_env();
    }
}
