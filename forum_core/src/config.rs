//! Central configuration helpers for the forum_core crate
//!
//! Components never read the environment on their own. Each configuration
//! object offers a `from_env()` constructor built on the helpers below, and the
//! resulting value is handed to the component that needs it.

use std::env;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

/// Trust level assigned to newly created accounts unless configured otherwise
pub const DEFAULT_TRUST_LEVEL: i32 = 1;

/// Highest trust level a site can hand out
pub const MAX_TRUST_LEVEL: i32 = 4;

/// Defaults applied to accounts created by authenticators
#[derive(Debug, Clone, PartialEq)]
pub struct UserDefaults {
    pub default_trust_level: i32,
}

impl Default for UserDefaults {
    fn default() -> Self {
        Self {
            default_trust_level: DEFAULT_TRUST_LEVEL,
        }
    }
}

impl UserDefaults {
    pub fn new(default_trust_level: i32) -> Result<Self, ConfigError> {
        if !(0..=MAX_TRUST_LEVEL).contains(&default_trust_level) {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_TRUST_LEVEL".to_string(),
                value: default_trust_level.to_string(),
            });
        }
        Ok(Self {
            default_trust_level,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        match env_string("DEFAULT_TRUST_LEVEL") {
            Some(raw) => {
                let level = raw.parse::<i32>().map_err(|_| ConfigError::Invalid {
                    name: "DEFAULT_TRUST_LEVEL".to_string(),
                    value: raw.clone(),
                })?;
                Self::new(level)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Read an environment variable, treating blank values as absent
pub(crate) fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn env_required(name: &str) -> Result<String, ConfigError> {
    env_string(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

pub(crate) fn env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match env_string(name) {
        Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
            name: name.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
