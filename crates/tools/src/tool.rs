use isocity_common::GridCoord;
use isocity_kernel::{BuildingKind, City};
use std::str::FromStr;

/// Editing tool the player applies to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Bulldoze,
    Residential,
    Commercial,
    Industrial,
    Road,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Bulldoze,
        Tool::Residential,
        Tool::Commercial,
        Tool::Industrial,
        Tool::Road,
    ];

    /// Identifier used by UI surfaces.
    pub fn id(self) -> &'static str {
        match self {
            Self::Bulldoze => "bulldoze",
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::Road => "road",
        }
    }

    /// Building this tool places, or `None` for bulldoze.
    pub fn building_kind(self) -> Option<BuildingKind> {
        match self {
            Self::Bulldoze => None,
            Self::Residential => Some(BuildingKind::Residential),
            Self::Commercial => Some(BuildingKind::Commercial),
            Self::Industrial => Some(BuildingKind::Industrial),
            Self::Road => Some(BuildingKind::Road),
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Errors from parsing tool identifiers at the UI boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool id {0:?}")]
    Unknown(String),
}

impl FromStr for Tool {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.id() == s)
            .ok_or_else(|| ToolError::Unknown(s.to_string()))
    }
}

/// What applying a tool did to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Placed(BuildingKind),
    Removed(BuildingKind),
    /// Bulldozing an empty tile, or placing onto an occupied one.
    Unchanged,
}

/// Apply `tool` to the tile at `coord`.
///
/// Bulldoze clears the tile unconditionally. Placement tools only build on
/// empty tiles and never overwrite an existing building. Panics when `coord`
/// is out of bounds.
pub fn apply_tool(tool: Tool, city: &mut City, coord: GridCoord) -> ToolOutcome {
    let outcome = match tool.building_kind() {
        None => match city.set_building(coord, None) {
            Some(previous) => ToolOutcome::Removed(previous.kind),
            None => ToolOutcome::Unchanged,
        },
        Some(kind) => {
            if city.tile(coord).is_occupied() {
                ToolOutcome::Unchanged
            } else {
                city.set_building(coord, Some(kind));
                ToolOutcome::Placed(kind)
            }
        }
    };
    tracing::debug!(%tool, %coord, ?outcome, "tool applied");
    outcome
}
