//! # Configuration Module
//!
//! Client configuration and validation.

pub mod config;

pub use config::AppConfig;
