use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level game configuration.
///
/// Every field falls back to its default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square city grid.
    pub grid_size: u32,
    /// Seed for the simulation RNG.
    pub seed: u64,
    /// Interval between simulation ticks, in milliseconds.
    pub tick_interval_ms: u64,
    pub camera: CameraConfig,
    pub growth: GrowthConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            seed: 42,
            tick_interval_ms: 1000,
            camera: CameraConfig::default(),
            growth: GrowthConfig::default(),
        }
    }
}

/// Orbit camera tuning. Angles are in degrees for readability in config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub initial_azimuth_degrees: f32,
    pub initial_elevation_degrees: f32,
    pub initial_radius: f32,
    pub min_radius: f32,
    /// Radius change per unit of wheel delta.
    pub zoom_sensitivity: f32,
    /// Degrees of orbit per pixel, as a multiple of `fov / viewport_width`.
    pub orbit_gain: f32,
    /// Pan distance per pixel, as a multiple of the zoom-scaled distance per pixel.
    pub pan_gain: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            initial_azimuth_degrees: 30.0,
            initial_elevation_degrees: 30.0,
            initial_radius: 25.0,
            min_radius: 2.0,
            zoom_sensitivity: 0.01,
            orbit_gain: 5.0,
            pan_gain: 4.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Per-tick building growth probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    pub grow_probability: f64,
    pub shrink_probability: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            grow_probability: 1e-2,
            shrink_probability: 5e-3,
        }
    }
}

impl GameConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::Invalid("grid_size must be at least 1".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than zero".into(),
            ));
        }

        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                cam.fov_degrees
            )));
        }
        if !(cam.min_radius > 0.0) {
            return Err(ConfigError::Invalid(
                "camera.min_radius must be positive".into(),
            ));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::Invalid(
                "camera clip planes must satisfy 0 < near < far".into(),
            ));
        }

        let growth = &self.growth;
        for (name, p) in [
            ("grow_probability", growth.grow_probability),
            ("shrink_probability", growth.shrink_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "growth.{name} must be in [0, 1], got {p}"
                )));
            }
        }
        if growth.grow_probability + growth.shrink_probability > 1.0 {
            return Err(ConfigError::Invalid(
                "growth probabilities must sum to at most 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.camera.fov_degrees, 35.0);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = GameConfig::from_yaml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = GameConfig::from_yaml_str("grid_size: 5\ncamera:\n  min_radius: 4.0\n").unwrap();
        assert_eq!(config.grid_size, 5);
        assert_eq!(config.camera.min_radius, 4.0);
        assert_eq!(config.camera.initial_radius, 25.0);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn zero_grid_size_rejected() {
        let err = GameConfig::from_yaml_str("grid_size: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn probabilities_must_fit_unit_interval() {
        let err = GameConfig::from_yaml_str("growth:\n  grow_probability: 0.8\n  shrink_probability: 0.5\n")
            .unwrap_err();
        assert!(err.to_string().contains("sum"));

        let err = GameConfig::from_yaml_str("growth:\n  grow_probability: -0.1\n").unwrap_err();
        assert!(err.to_string().contains("grow_probability"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = GameConfig::from_yaml_str("grid_size: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city.yaml");
        std::fs::write(&path, "grid_size: 8\ntick_interval_ms: 250\n").unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.grid_size, 8);
        assert_eq!(config.tick_interval_ms, 250);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GameConfig::load("/nonexistent/isocity.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn yaml_output_parses_back() {
        let config = GameConfig {
            grid_size: 3,
            ..GameConfig::default()
        };
        let text = config.to_yaml_string().unwrap();
        assert_eq!(GameConfig::from_yaml_str(&text).unwrap(), config);
    }
}
