//! Configuration management for the site API server.
//!
//! All configuration comes from the environment (a `.env` file is loaded at
//! startup when present). Only the upstream model key is required; everything
//! else has a deployment-friendly default.

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Upstream model API settings
    pub anthropic: AnthropicConfig,

    /// Inquiry notification email settings; `None` disables sending
    pub email: Option<EmailConfig>,

    /// Length of one rate-limit window
    pub rate_limit_window: Duration,

    /// Timeout applied to each upstream HTTP call
    pub upstream_timeout: Duration,
}

/// Connection settings for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key sent as `x-api-key`
    pub api_key: String,

    /// Base URL, no trailing slash
    pub base_url: String,

    /// Model id used for every endpoint
    pub model: String,
}

/// Transactional email API settings for the inquiry notification.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Base URL of the email API, no trailing slash
    pub api_base: String,

    /// Bearer token for the email API
    pub api_key: String,

    /// Sender address, e.g. `Tioga AI <noreply@tioga.ai>`
    pub from: String,

    /// Sales inbox that receives inquiry notifications
    pub inquiry_recipient: String,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Fails only when `ANTHROPIC_API_KEY` is missing. The email section is
    /// assembled when all three of `EMAIL_API_KEY`, `EMAIL_FROM` and
    /// `INQUIRY_RECIPIENT` are present; otherwise notifications are disabled.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY must be set")?;

        let anthropic = AnthropicConfig {
            api_key,
            base_url: env_or("ANTHROPIC_BASE_URL", "https://api.anthropic.com")
                .trim_end_matches('/')
                .to_string(),
            model: env_or("ANTHROPIC_MODEL", "claude-haiku-4-5-20251001"),
        };

        let email = match (
            non_empty_env("EMAIL_API_KEY"),
            non_empty_env("EMAIL_FROM"),
            non_empty_env("INQUIRY_RECIPIENT"),
        ) {
            (Some(api_key), Some(from), Some(inquiry_recipient)) => Some(EmailConfig {
                api_base: env_or("EMAIL_API_BASE", "https://api.resend.com")
                    .trim_end_matches('/')
                    .to_string(),
                api_key,
                from,
                inquiry_recipient,
            }),
            _ => None,
        };

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 8080),
            anthropic,
            email,
            rate_limit_window: Duration::from_secs(env_parse(
                "RATE_LIMIT_WINDOW_SECS",
                86400u64,
            )),
            upstream_timeout: Duration::from_secs(env_parse("UPSTREAM_TIMEOUT_SECS", 120u64)),
        })
    }
}

/// Read a string variable, falling back to `default` when unset or empty.
fn env_or(key: &str, default: &str) -> String {
    non_empty_env(key).unwrap_or_else(|| default.to_string())
}

/// Read a variable and parse it, falling back to `default` when unset,
/// empty, or unparseable.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    non_empty_env(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "ANTHROPIC_API_KEY",
            "ANTHROPIC_BASE_URL",
            "ANTHROPIC_MODEL",
            "EMAIL_API_KEY",
            "EMAIL_FROM",
            "INQUIRY_RECIPIENT",
            "EMAIL_API_BASE",
            "HOST",
            "PORT",
            "RATE_LIMIT_WINDOW_SECS",
            "UPSTREAM_TIMEOUT_SECS",
        ] {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_key() {
        clear_env();
        assert!(AppConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("ANTHROPIC_API_KEY", "sk-test");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.anthropic.base_url, "https://api.anthropic.com");
        assert_eq!(config.anthropic.model, "claude-haiku-4-5-20251001");
        assert_eq!(config.rate_limit_window, Duration::from_secs(86400));
        assert_eq!(config.upstream_timeout, Duration::from_secs(120));
        assert!(config.email.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides_and_trailing_slash() {
        clear_env();
        unsafe {
            std::env::set_var("ANTHROPIC_API_KEY", "sk-test");
            std::env::set_var("ANTHROPIC_BASE_URL", "http://localhost:9999/");
            std::env::set_var("PORT", "3000");
            std::env::set_var("RATE_LIMIT_WINDOW_SECS", "60");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.anthropic.base_url, "http://localhost:9999");
        assert_eq!(config.port, 3000);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_email_config_requires_all_three_vars() {
        clear_env();
        unsafe {
            std::env::set_var("ANTHROPIC_API_KEY", "sk-test");
            std::env::set_var("EMAIL_API_KEY", "re-test");
            std::env::set_var("EMAIL_FROM", "Tioga AI <noreply@tioga.ai>");
        }

        let config = AppConfig::from_env().unwrap();
        assert!(config.email.is_none());

        unsafe {
            std::env::set_var("INQUIRY_RECIPIENT", "sales@tioga.ai");
        }
        let config = AppConfig::from_env().unwrap();
        let email = config.email.unwrap();
        assert_eq!(email.api_base, "https://api.resend.com");
        assert_eq!(email.inquiry_recipient, "sales@tioga.ai");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparseable_numeric_falls_back() {
        clear_env();
        unsafe {
            std::env::set_var("ANTHROPIC_API_KEY", "sk-test");
            std::env::set_var("PORT", "not-a-port");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        clear_env();
    }
}
