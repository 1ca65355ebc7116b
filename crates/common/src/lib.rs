//! Shared types and configuration for the isocity workspace.
//!
//! # Invariants
//! - Grid coordinates are unsigned; bounds are owned by the city grid.
//! - Every configuration field has a default, so partial files are valid.

pub mod config;
mod types;

pub use config::{CameraConfig, ConfigError, GameConfig, GrowthConfig};
pub use types::GridCoord;
