//! Process-wide configuration shared by the rest of the crate.

pub mod config;

pub use config::{AllocatorConfig, Config, ConfigError, EngineConfig};
