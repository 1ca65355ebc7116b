use isocity_common::GridCoord;
use serde::{Deserialize, Serialize};

/// Ground cover of a tile. Terrain never changes after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainKind {
    #[default]
    Grass,
}

/// Kind of building a tile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    Residential,
    Commercial,
    Industrial,
    Road,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Residential,
        BuildingKind::Commercial,
        BuildingKind::Industrial,
        BuildingKind::Road,
    ];

    /// Stable lowercase identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::Road => "road",
        }
    }

    /// Whether ticks can change this building's height. Roads stay flat.
    pub fn grows(self) -> bool {
        !matches!(self, Self::Road)
    }
}

impl std::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A building owned by exactly one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    /// Height in levels, never below 1.
    pub height: u32,
}

impl Building {
    /// Visual slab height of a road.
    pub const ROAD_HEIGHT: f32 = 0.1;

    /// A freshly placed building: one level tall.
    pub fn new(kind: BuildingKind) -> Self {
        Self { kind, height: 1 }
    }

    /// World-space height of the building's box.
    pub fn visual_height(&self) -> f32 {
        if self.kind.grows() {
            self.height as f32
        } else {
            Self::ROAD_HEIGHT
        }
    }
}

/// One cell of the city grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: GridCoord,
    pub terrain: TerrainKind,
    pub building: Option<Building>,
}

impl Tile {
    pub fn new(coord: GridCoord) -> Self {
        Self {
            coord,
            terrain: TerrainKind::Grass,
            building: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.building.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_building_is_one_level() {
        for kind in BuildingKind::ALL {
            assert_eq!(Building::new(kind).height, 1);
        }
    }

    #[test]
    fn road_is_flat() {
        assert!(!BuildingKind::Road.grows());
        let road = Building {
            kind: BuildingKind::Road,
            height: 7,
        };
        assert_eq!(road.visual_height(), Building::ROAD_HEIGHT);
    }

    #[test]
    fn zoned_buildings_render_at_their_level() {
        let b = Building {
            kind: BuildingKind::Commercial,
            height: 3,
        };
        assert_eq!(b.visual_height(), 3.0);
    }

    #[test]
    fn new_tile_is_empty_grass() {
        let tile = Tile::new(GridCoord::new(1, 2));
        assert_eq!(tile.terrain, TerrainKind::Grass);
        assert!(!tile.is_occupied());
    }

    #[test]
    fn kind_ids_are_lowercase() {
        let ids: Vec<&str> = BuildingKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids, ["residential", "commercial", "industrial", "road"]);
    }
}
