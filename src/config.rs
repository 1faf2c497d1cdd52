//! # Configuration Module
//!
//! This module defines configuration structures for the recipe assistant,
//! including model selection, retry settings and the history location.
//!
//! Values come from environment variables (optionally loaded from a `.env`
//! file by the binary). The API key is deliberately not part of [`AppConfig`]:
//! it is resolved by [`resolve_api_key`] at the start of every operation so a
//! changed key is picked up without rebuilding anything.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{RecipeError, Result};

// Constants for service configuration
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EXTRACT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_RECIPE_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_THINKING_BUDGET: u32 = 4000;
pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variables checked for the API key, in priority order
pub const API_KEY_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

/// Recovery configuration for transient service failures
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts after the first call
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub base_retry_delay_ms: u64,
    /// Upper bound for any single delay in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000, // 1 second
            max_retry_delay_ms: 10000, // 10 seconds
        }
    }
}

/// Configuration structure for the recipe assistant
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the generative language API
    pub api_base: String,
    /// Model used for the image extraction call
    pub extract_model: String,
    /// Model used for the recipe generation call
    pub recipe_model: String,
    /// Reasoning budget hint for recipe generation (0 disables the hint)
    pub thinking_budget: u32,
    /// Natural language the model should answer in
    pub language: String,
    /// Directory holding the persisted history
    pub data_dir: PathBuf,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Retry configuration
    pub recovery: RecoveryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            extract_model: DEFAULT_EXTRACT_MODEL.to_string(),
            recipe_model: DEFAULT_RECIPE_MODEL.to_string(),
            thinking_budget: DEFAULT_THINKING_BUDGET,
            language: DEFAULT_LANGUAGE.to_string(),
            data_dir: default_data_dir(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            recovery: RecoveryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    ///
    /// Optional:
    /// - `PANTRY_CHEF_API_BASE`
    /// - `PANTRY_CHEF_EXTRACT_MODEL` / `PANTRY_CHEF_RECIPE_MODEL`
    /// - `PANTRY_CHEF_THINKING_BUDGET`
    /// - `PANTRY_CHEF_LANGUAGE`
    /// - `PANTRY_CHEF_DATA_DIR`
    /// - `PANTRY_CHEF_TIMEOUT_SECS`
    /// - `PANTRY_CHEF_MAX_RETRIES` / `PANTRY_CHEF_RETRY_DELAY_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unparsable numeric values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let recovery = RecoveryConfig {
            max_retries: parse_or(
                get("PANTRY_CHEF_MAX_RETRIES"),
                defaults.recovery.max_retries,
            ),
            base_retry_delay_ms: parse_or(
                get("PANTRY_CHEF_RETRY_DELAY_MS"),
                defaults.recovery.base_retry_delay_ms,
            ),
            ..defaults.recovery
        };

        Self {
            api_base: get("PANTRY_CHEF_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            extract_model: get("PANTRY_CHEF_EXTRACT_MODEL").unwrap_or(defaults.extract_model),
            recipe_model: get("PANTRY_CHEF_RECIPE_MODEL").unwrap_or(defaults.recipe_model),
            thinking_budget: parse_or(
                get("PANTRY_CHEF_THINKING_BUDGET"),
                defaults.thinking_budget,
            ),
            language: get("PANTRY_CHEF_LANGUAGE").unwrap_or(defaults.language),
            data_dir: get("PANTRY_CHEF_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            timeout_secs: parse_or(get("PANTRY_CHEF_TIMEOUT_SECS"), defaults.timeout_secs),
            recovery,
        }
    }
}

// Out-of-range values fail to parse and keep the default instead of wrapping
fn parse_or<T: FromStr>(value: Option<String>, fallback: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(fallback)
}

/// Default data directory: ~/.pantry-chef, or ./data without a home directory
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".pantry-chef"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Resolve the API key from the process environment.
pub fn resolve_api_key() -> Result<String> {
    resolve_api_key_with(|key| env::var(key).ok())
}

/// Resolve the API key through `lookup`, first non-blank variable wins.
pub fn resolve_api_key_with<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or(RecipeError::MissingCredential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_recovery_config_defaults() {
        let recovery = RecoveryConfig::default();
        assert_eq!(recovery.max_retries, 3);
        assert_eq!(recovery.base_retry_delay_ms, 1000);
        assert_eq!(recovery.max_retry_delay_ms, 10000);
    }

    #[test]
    fn test_from_lookup_uses_defaults_when_empty() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.extract_model, DEFAULT_EXTRACT_MODEL);
        assert_eq!(config.recipe_model, DEFAULT_RECIPE_MODEL);
        assert_eq!(config.thinking_budget, 4000);
        assert_eq!(config.recovery, RecoveryConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PANTRY_CHEF_API_BASE", "http://localhost:8080/v1/"),
            ("PANTRY_CHEF_RECIPE_MODEL", "gemini-2.5-flash"),
            ("PANTRY_CHEF_THINKING_BUDGET", "0"),
            ("PANTRY_CHEF_MAX_RETRIES", "5"),
            ("PANTRY_CHEF_RETRY_DELAY_MS", "not-a-number"),
            ("PANTRY_CHEF_DATA_DIR", "/tmp/chef"),
        ]));

        assert_eq!(config.api_base, "http://localhost:8080/v1");
        assert_eq!(config.recipe_model, "gemini-2.5-flash");
        assert_eq!(config.thinking_budget, 0);
        assert_eq!(config.recovery.max_retries, 5);
        assert_eq!(config.recovery.base_retry_delay_ms, 1000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/chef"));
    }

    #[test]
    fn test_out_of_range_numbers_keep_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PANTRY_CHEF_MAX_RETRIES", "4294967296"),
            ("PANTRY_CHEF_THINKING_BUDGET", "-1"),
            ("PANTRY_CHEF_TIMEOUT_SECS", "30"),
        ]));

        assert_eq!(config.recovery.max_retries, 3);
        assert_eq!(config.thinking_budget, DEFAULT_THINKING_BUDGET);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_resolve_api_key_priority() {
        let key = resolve_api_key_with(lookup_from(&[
            ("GOOGLE_API_KEY", "google"),
            ("API_KEY", "generic"),
        ]))
        .unwrap();
        assert_eq!(key, "google");
    }

    #[test]
    fn test_resolve_api_key_skips_blank_values() {
        let key = resolve_api_key_with(lookup_from(&[
            ("GEMINI_API_KEY", "   "),
            ("API_KEY", "generic"),
        ]))
        .unwrap();
        assert_eq!(key, "generic");
    }

    #[test]
    fn test_resolve_api_key_missing() {
        let result = resolve_api_key_with(|_| None);
        assert_eq!(result, Err(RecipeError::MissingCredential));
    }
}
