//! Tools: the closed set of editing tools, their application to city tiles,
//! and a read-only inspector for UI panels and the CLI.
//!
//! # Invariants
//! - Tool ids are parsed once, at the UI boundary.
//! - Placement never overwrites an existing building.

mod inspector;
mod tool;

pub use inspector::{CityInspector, CitySummary, TileInfo};
pub use tool::{Tool, ToolError, ToolOutcome, apply_tool};
