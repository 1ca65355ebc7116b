use isocity_common::GridCoord;
use isocity_kernel::{BuildingKind, City, TerrainKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Read-only queries against the city for debugging and UI panels.
pub struct CityInspector;

impl CityInspector {
    /// Produce a summary of the city state.
    pub fn summary(city: &City) -> CitySummary {
        let mut buildings: BTreeMap<BuildingKind, usize> = BTreeMap::new();
        let mut max_height = 0;
        for (_, building) in city.buildings() {
            *buildings.entry(building.kind).or_default() += 1;
            if building.kind.grows() {
                max_height = max_height.max(building.height);
            }
        }
        CitySummary {
            size: city.size(),
            tick: city.tick_count(),
            seed: city.seed(),
            buildings,
            max_height,
            pending_diffs: city.pending_diff_count(),
            state_hash: city.state_hash(),
        }
    }

    /// Details about one tile, or `None` when out of bounds.
    pub fn inspect_tile(city: &City, coord: GridCoord) -> Option<TileInfo> {
        city.get(coord).map(|tile| TileInfo {
            coord,
            terrain: tile.terrain,
            building: tile.building.map(|b| (b.kind, b.height)),
        })
    }
}

/// Summary of city state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct CitySummary {
    pub size: u32,
    pub tick: u64,
    pub seed: u64,
    pub buildings: BTreeMap<BuildingKind, usize>,
    /// Tallest zoned building; roads are excluded.
    pub max_height: u32,
    pub pending_diffs: usize,
    pub state_hash: u64,
}

impl CitySummary {
    pub fn total_buildings(&self) -> usize {
        self.buildings.values().sum()
    }

    pub fn count(&self, kind: BuildingKind) -> usize {
        self.buildings.get(&kind).copied().unwrap_or(0)
    }
}

impl std::fmt::Display for CitySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "City: size={} tick={} buildings={} (R={} C={} I={} road={}) max_height={} pending_diffs={}",
            self.size,
            self.tick,
            self.total_buildings(),
            self.count(BuildingKind::Residential),
            self.count(BuildingKind::Commercial),
            self.count(BuildingKind::Industrial),
            self.count(BuildingKind::Road),
            self.max_height,
            self.pending_diffs,
        )
    }
}

/// Detailed info about a single tile.
#[derive(Debug, Clone, Serialize)]
pub struct TileInfo {
    pub coord: GridCoord,
    pub terrain: TerrainKind,
    pub building: Option<(BuildingKind, u32)>,
}

impl std::fmt::Display for TileInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tile {} terrain={:?}", self.coord, self.terrain)?;
        match self.building {
            Some((kind, height)) => write!(f, " building={kind} height={height}"),
            None => write!(f, " building=none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_empty_city() {
        let city = City::new(4);
        let summary = CityInspector::summary(&city);
        assert_eq!(summary.size, 4);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.total_buildings(), 0);
        assert_eq!(summary.max_height, 0);
    }

    #[test]
    fn summary_counts_by_kind() {
        let mut city = City::new(3);
        city.set_building(GridCoord::new(0, 0), Some(BuildingKind::Road));
        city.set_building(GridCoord::new(0, 1), Some(BuildingKind::Road));
        city.set_building(GridCoord::new(2, 2), Some(BuildingKind::Commercial));
        city.tick();

        let summary = CityInspector::summary(&city);
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.count(BuildingKind::Road), 2);
        assert_eq!(summary.count(BuildingKind::Commercial), 1);
        assert_eq!(summary.count(BuildingKind::Industrial), 0);
        assert_eq!(summary.total_buildings(), 3);
        assert!(summary.max_height >= 1);
    }

    #[test]
    fn inspect_tile_found() {
        let mut city = City::new(2);
        let c = GridCoord::new(1, 0);
        city.set_building(c, Some(BuildingKind::Industrial));
        let info = CityInspector::inspect_tile(&city, c).unwrap();
        assert_eq!(info.building, Some((BuildingKind::Industrial, 1)));
        assert_eq!(info.to_string(), "Tile (1, 0) terrain=Grass building=industrial height=1");
    }

    #[test]
    fn inspect_tile_out_of_bounds() {
        let city = City::new(2);
        assert!(CityInspector::inspect_tile(&city, GridCoord::new(9, 9)).is_none());
    }

    #[test]
    fn summary_display() {
        let city = City::new(2);
        let s = CityInspector::summary(&city).to_string();
        assert!(s.contains("size=2"));
        assert!(s.contains("tick=0"));
    }
}
