// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Process configuration, sourced from the environment.
//!
//! The gateway is configured entirely through `S2T_*` environment
//! variables; only the API key is mandatory. Startup fails before any
//! traffic is served when it is absent.

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://accelerator.s2t.dev";
pub const DEFAULT_PORT: u16 = 3001;

pub const ENV_API_KEY: &str = "S2T_API_KEY";
pub const ENV_BASE_URL: &str = "S2T_API_URL";
pub const ENV_PORT: &str = "S2T_PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "S2T_ALLOWED_ORIGINS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{ENV_API_KEY} is not set; an accelerator API key is required")]
    MissingApiKey,

    #[error("{name} has an invalid value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable process configuration. Read once at startup, shared by value.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: String,
    pub port: u16,
    /// Exact origins or `*.domain` wildcard-suffix entries. Empty means
    /// unrestricted (local/dev posture).
    pub allowed_origins: Vec<String>,
}

impl GatewayConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingApiKey`] when `S2T_API_KEY` is unset or
    /// blank; [`ConfigError::InvalidValue`] for an unparseable port.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Testable core of [`Self::from_env`]: resolve from any lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(ENV_API_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = lookup(ENV_BASE_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let port = match lookup(ENV_PORT).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: ENV_PORT,
                value: raw,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = lookup(ENV_ALLOWED_ORIGINS)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            api_key,
            base_url,
            port,
            allowed_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = GatewayConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_blank_api_key_is_fatal() {
        let err =
            GatewayConfig::from_lookup(lookup_from(&[(ENV_API_KEY, "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            GatewayConfig::from_lookup(lookup_from(&[(ENV_API_KEY, "key")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_origin_list_parsed_and_trimmed() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "key"),
            (ENV_ALLOWED_ORIGINS, "https://app.s2t.dev, *.s2t.dev ,"),
        ]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://app.s2t.dev".to_string(), "*.s2t.dev".to_string()]
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "key"),
            (ENV_PORT, "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "S2T_PORT", .. }));
    }
}
