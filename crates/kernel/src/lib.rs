//! City kernel: authoritative grid state, stochastic growth ticks, tile diffs, replay.
//!
//! # Invariants
//! - Grid dimensions are fixed at construction.
//! - At most one building per tile.
//! - Out-of-bounds tile access is a programmer error and panics.
//! - Pending tile diffs are drained exactly once by the visual layer.

mod building;
pub mod city;

pub use building::{Building, BuildingKind, TerrainKind, Tile};
pub use city::{City, CityEvent, TileDiff};
