//! Typed configuration for the engine's own defaults.
//!
//! This is not the render graph JSON document format (see `graph::json`)
//! — it is the smaller set of process-wide defaults the graph system is
//! parameterized by: shadow cascade sizing and the retired-buffer ring
//! depth.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Failure modes for [`Config::load_from_file`]/[`Config::save_to_file`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The file's contents could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The value could not be serialized.
    #[error("config serialize error: {0}")]
    Serialize(String),
    /// The file extension did not match a supported format (`.toml`, `.ron`).
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Load/save support for TOML or RON, selected by file extension.
pub trait Config: Sized + Serialize + for<'de> Deserialize<'de> {
    /// Load a config from `path`, inferring format from its extension.
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string())),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Save this config to `path`, inferring format from its extension.
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        fs::write(path, text)?;
        Ok(())
    }
}

/// Process-wide engine defaults: shadow cascade sizing and the retired
/// buffer ring depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Edge length, in texels, of one shadow cascade map.
    pub shadow_map_size: u32,
    /// Number of shadow cascades (at most [`crate::material::shadow::SHADOW_CASCADE_COUNT_MAX`]).
    pub cascade_count: u32,
    /// Frames to wait past `retire_at_frame` before a buffer is actually
    /// destroyed.
    pub default_retire_after_frames: u32,
}

impl EngineConfig {
    /// Validate the ranges this type can't express structurally.
    pub fn validate(&self) -> Result<(), String> {
        if self.cascade_count == 0 || self.cascade_count > 4 {
            return Err("cascade_count must be in 1..=4".to_string());
        }
        if self.shadow_map_size == 0 {
            return Err("shadow_map_size must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shadow_map_size: 2048,
            cascade_count: 4,
            default_retire_after_frames: 3,
        }
    }
}

impl Config for EngineConfig {}

/// Default capacities for the three [`crate::foundation::memory::AllocatorKind`]
/// variants the engine stands up at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Initial reserved bytes for the general-purpose allocator.
    pub general_default_capacity: usize,
    /// Initial reserved bytes for the per-frame arena.
    pub arena_default_capacity: usize,
    /// Initial reserved bytes for the fixed-block pool.
    pub pool_default_capacity: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            general_default_capacity: 16 * 1024 * 1024,
            arena_default_capacity: 4 * 1024 * 1024,
            pool_default_capacity: 1024 * 1024,
        }
    }
}

impl Config for AllocatorConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn engine_config_round_trips_through_toml() {
        let dir = std::env::temp_dir().join("render_graph_config_test.toml");
        let cfg = EngineConfig::default();
        cfg.save_to_file(&dir).unwrap();
        let loaded = EngineConfig::load_from_file(&dir).unwrap();
        assert_eq!(loaded.shadow_map_size, cfg.shadow_map_size);
        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn rejects_unsupported_extension() {
        let err = EngineConfig::load_from_file("/tmp/nonexistent.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
