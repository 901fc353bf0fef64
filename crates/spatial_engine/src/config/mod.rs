//! Configuration system
//!
//! Settings for the quad tree and the collision grid, loadable from TOML or
//! RON files.

pub use serde::{Deserialize, Serialize};

use crate::physics::GridConfig;
use crate::spatial::QuadTreeConfig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Value out of range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Settings for both spatial subsystems
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Quad tree behaviour
    pub quad_tree: QuadTreeConfig,
    /// Broad-phase grid used by the collision manager
    pub collision_grid: GridConfig,
}

impl SpatialConfig {
    /// Check every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quad_tree.validate()?;
        self.collision_grid.validate()
    }

    /// Load from file and validate in one step
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config for SpatialConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SpatialConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_partial_config_uses_defaults() {
        let config: SpatialConfig = toml::from_str(
            "[collision_grid]\ncell_size = 25.0\n",
        ).unwrap();

        assert_eq!(config.collision_grid.cell_size, 25.0);
        assert_eq!(config.collision_grid.width, GridConfig::default().width);
        assert_eq!(config.quad_tree, QuadTreeConfig::default());
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("spatial_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let mut config = SpatialConfig::default();
        config.quad_tree.max_depth = 6;
        config.collision_grid.origin = Vec2::new(-500.0, -500.0);
        config.save_to_file(&path).unwrap();

        let loaded = SpatialConfig::load_validated(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SpatialConfig::default();
        config.collision_grid.cell_size = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SpatialConfig::default();
        config.quad_tree.max_depth = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SpatialConfig::default().save_to_file("settings.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
