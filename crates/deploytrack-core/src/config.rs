//! Tracker configuration (JSON file or environment variables).

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::DEFAULT_ACTOR;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5239/api";

/// When a promotion is written to the local snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionPolicy {
    /// Apply locally first, then ask the collaborator. A failed confirmation
    /// is reported but not rolled back.
    #[default]
    Optimistic,
    /// Apply only after the collaborator confirms, like every other mutation.
    ConfirmFirst,
}

impl FromStr for PromotionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "optimistic" => Ok(PromotionPolicy::Optimistic),
            "confirm_first" => Ok(PromotionPolicy::ConfirmFirst),
            other => Err(format!("unknown promotion policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Base URL for transport adapters; the core itself does not dial it.
    pub api_base_url: String,
    /// Actor recorded when a version edit or promotion names nobody.
    pub default_actor: String,
    pub promotion_policy: PromotionPolicy,
    /// Run `fetch_all` after every confirmed mutation.
    pub resync_after_mutation: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_actor: DEFAULT_ACTOR.to_string(),
            promotion_policy: PromotionPolicy::default(),
            resync_after_mutation: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl TrackerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Load from `DEPLOYTRACK_*` variables; invalid values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("DEPLOYTRACK_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(actor) = lookup("DEPLOYTRACK_DEFAULT_ACTOR") {
            if actor.trim().is_empty() {
                warn!("DEPLOYTRACK_DEFAULT_ACTOR is empty, keeping '{}'", config.default_actor);
            } else {
                config.default_actor = actor.trim().to_string();
            }
        }

        if let Some(raw) = lookup("DEPLOYTRACK_PROMOTION_POLICY") {
            match raw.parse() {
                Ok(policy) => config.promotion_policy = policy,
                Err(e) => warn!(value = %raw, "{e}, using optimistic"),
            }
        }

        if let Some(raw) = lookup("DEPLOYTRACK_RESYNC") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.resync_after_mutation = true,
                "0" | "false" | "no" | "off" => config.resync_after_mutation = false,
                _ => warn!(value = %raw, "DEPLOYTRACK_RESYNC is not a boolean, ignoring"),
            }
        }

        config
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
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_dashboard() {
        let config = TrackerConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:5239/api");
        assert_eq!(config.default_actor, "system");
        assert_eq!(config.promotion_policy, PromotionPolicy::Optimistic);
        assert!(!config.resync_after_mutation);
    }

    #[test]
    fn env_overrides_defaults() {
        let config = TrackerConfig::from_lookup(lookup(&[
            ("DEPLOYTRACK_API_BASE_URL", "https://tracker.internal/api/"),
            ("DEPLOYTRACK_DEFAULT_ACTOR", "ci-bot"),
            ("DEPLOYTRACK_PROMOTION_POLICY", "confirm-first"),
            ("DEPLOYTRACK_RESYNC", "yes"),
        ]));
        assert_eq!(config.api_base_url, "https://tracker.internal/api");
        assert_eq!(config.default_actor, "ci-bot");
        assert_eq!(config.promotion_policy, PromotionPolicy::ConfirmFirst);
        assert!(config.resync_after_mutation);
    }

    #[test]
    fn invalid_env_values_fall_back() {
        let config = TrackerConfig::from_lookup(lookup(&[
            ("DEPLOYTRACK_DEFAULT_ACTOR", "  "),
            ("DEPLOYTRACK_PROMOTION_POLICY", "yolo"),
            ("DEPLOYTRACK_RESYNC", "maybe"),
        ]));
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            TrackerConfig::from_json_str(r#"{ "promotion_policy": "confirm_first" }"#).unwrap();
        assert_eq!(config.promotion_policy, PromotionPolicy::ConfirmFirst);
        assert_eq!(config.default_actor, "system");

        assert!(matches!(
            TrackerConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
