//! # Configuration Module
//!
//! Client-side settings shared by the CLI and the library: where the proxy lives,
//! how images are squeezed before upload, where the diary is kept, and how the
//! scanner behaves.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `proxy_url` | `String` | `http://127.0.0.1:3000/api/gemini` | Analysis endpoint |
//! | `request_timeout` | `Duration` | 90 s | Whole-request timeout |
//! | `payload_ceiling` | `usize` | 4 500 000 | Largest request body the client will send |
//! | `optimize` | `OptimizeConfig` | 1024 px / q40 | Upload down-scaling |
//! | `diary_dir` | `PathBuf` | `.symbiotic` | Directory of the file history backend |
//! | `diary_capacity` | `usize` | 20 | Entries kept in the diary |
//! | `scanner` | `ScannerConfig` | 3 s, 1920 px, 4:3, x3, q92 | Camera countdown and crop |
//!
//! ## Environment
//!
//! [`AppConfig::from_env`] starts from the defaults and applies `SYMBIOTIC_PROXY_URL`
//! and `SYMBIOTIC_DIARY_DIR` when they are set and non-blank.
//!
//! ## Examples
//!
//! ```rust
//! use symbiotic_study::config::AppConfig;
//!
//! let config = AppConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.diary_capacity, 20);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use study_scale::OptimizeConfig;

use crate::capture::ScannerConfig;

pub const PROXY_URL_VAR: &str = "SYMBIOTIC_PROXY_URL";
pub const DIARY_DIR_VAR: &str = "SYMBIOTIC_DIARY_DIR";

pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000/api/gemini";
/// Matches the proxy's request body limit.
pub const DEFAULT_PAYLOAD_CEILING: usize = 4_500_000;
pub const DEFAULT_DIARY_CAPACITY: usize = 20;

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Full URL of the proxy's analysis route.
    pub proxy_url: String,

    /// Timeout applied to each analysis request.
    ///
    /// Generation with an image attached routinely takes tens of seconds, so this is
    /// longer than the proxy's own provider timeout.
    pub request_timeout: Duration,

    /// Largest serialized request the client sends. Anything bigger is refused
    /// before touching the network.
    pub payload_ceiling: usize,

    /// Down-scaling applied to every image before upload.
    pub optimize: OptimizeConfig,

    /// Directory for the file history backend.
    pub diary_dir: PathBuf,

    /// Number of diary entries kept, newest first.
    pub diary_capacity: usize,

    pub scanner: ScannerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            request_timeout: Duration::from_secs(90),
            payload_ceiling: DEFAULT_PAYLOAD_CEILING,
            optimize: OptimizeConfig::default(),
            diary_dir: PathBuf::from(".symbiotic"),
            diary_capacity: DEFAULT_DIARY_CAPACITY,
            scanner: ScannerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::default();
        if let Some(url) = non_blank(PROXY_URL_VAR) {
            config.proxy_url = url;
        }
        if let Some(dir) = non_blank(DIARY_DIR_VAR) {
            config.diary_dir = PathBuf::from(dir);
        }
        config
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.proxy_url.starts_with("http://") || self.proxy_url.starts_with("https://")) {
            return Err(format!("Proxy URL must be http(s), got '{}'", self.proxy_url));
        }
        if self.request_timeout.is_zero() {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.payload_ceiling == 0 {
            return Err("Payload ceiling must be greater than 0".to_string());
        }
        if self.diary_capacity == 0 {
            return Err("Diary capacity must be greater than 0".to_string());
        }
        self.optimize.validate()?;
        self.scanner.validate()?;
        Ok(())
    }
}
