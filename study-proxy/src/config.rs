// SPDX-License-Identifier: MIT
//! # Proxy Configuration
//!
//! Everything the proxy needs comes from its execution environment:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `GEMINI_API_KEY` | one of the two | - | Provider credential, checked first |
//! | `API_KEY` | one of the two | - | Fallback credential name |
//! | `GEMINI_MODEL` | no | `gemini-1.5-flash` | Model used for `generateContent` |
//! | `GEMINI_API_BASE` | no | `https://generativelanguage.googleapis.com` | Provider base URL |
//! | `ANSWER_LANGUAGE` | no | `Vietnamese` | Language the answers are written in |
//!
//! A missing credential does not stop the server from starting; every analysis
//! request is then refused with a configuration error instead of being forwarded.

use std::time::Duration;

pub const PRIMARY_KEY_VAR: &str = "GEMINI_API_KEY";
pub const FALLBACK_KEY_VAR: &str = "API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_LANGUAGE: &str = "Vietnamese";

/// Hosted serverless functions reject bodies above 4.5 MB.
pub const DEFAULT_BODY_LIMIT: usize = 4_500_000;

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Provider credential; `None` makes every analysis request fail fast.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// Language named in the instruction template.
    pub language: String,
    /// Sampling temperature; kept near zero so answers are reproducible.
    pub temperature: f32,
    /// Upper bound on a single provider call.
    pub timeout: Duration,
    /// Maximum accepted request body in bytes.
    pub body_limit: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(60),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ProxyConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Blank values count as unset, so `GEMINI_API_KEY=""` still falls through to
    /// `API_KEY`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            api_key: get(PRIMARY_KEY_VAR).or_else(|| get(FALLBACK_KEY_VAR)),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            api_base: get("GEMINI_API_BASE").unwrap_or(defaults.api_base),
            language: get("ANSWER_LANGUAGE").unwrap_or(defaults.language),
            ..defaults
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if self.timeout.is_zero() {
            return Err("timeout must be greater than 0".to_string());
        }
        if self.body_limit == 0 {
            return Err("body_limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn primary_key_wins() {
        let cfg = ProxyConfig::from_lookup(lookup(&[
            (PRIMARY_KEY_VAR, "primary"),
            (FALLBACK_KEY_VAR, "fallback"),
        ]));
        assert_eq!(cfg.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn fallback_key_is_used_when_primary_is_blank() {
        let cfg = ProxyConfig::from_lookup(lookup(&[
            (PRIMARY_KEY_VAR, "  "),
            (FALLBACK_KEY_VAR, "fallback"),
        ]));
        assert_eq!(cfg.api_key.as_deref(), Some("fallback"));
    }

    #[test]
    fn no_key_at_all() {
        let cfg = ProxyConfig::from_lookup(lookup(&[]));
        assert!(!cfg.has_credential());
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = ProxyConfig::from_lookup(lookup(&[
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("ANSWER_LANGUAGE", "English"),
        ]));
        assert_eq!(cfg.model, "gemini-2.0-flash");
        assert_eq!(cfg.language, "English");
    }

    #[test]
    fn validation() {
        let mut cfg = ProxyConfig::default();
        cfg.temperature = 3.0;
        assert!(cfg.validate().is_err());
        cfg.temperature = 0.1;
        cfg.timeout = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }
}
