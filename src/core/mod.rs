//! # Core Infrastructure Module
//!
//! Small containers shared by the higher-level modules.

pub mod ring_buffer;

pub use ring_buffer::RecentLog;
