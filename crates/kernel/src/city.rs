use crate::building::{Building, BuildingKind, Tile};
use isocity_common::{GameConfig, GridCoord, GrowthConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net change to a tile that the visual layer has not seen yet.
///
/// "Unchanged" is the absence of an entry in the pending set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileDiff {
    /// A building appeared on a tile that had none.
    Added,
    /// The tile's building was removed.
    Removed,
    /// The tile still holds a building but it must be rebuilt.
    Changed,
}

impl TileDiff {
    /// Fold a newer change into an older pending one.
    ///
    /// Returns `None` when the two cancel out (placed then removed between syncs).
    fn merge(prev: Option<TileDiff>, next: TileDiff) -> Option<TileDiff> {
        use TileDiff::*;
        match (prev, next) {
            (None, next) => Some(next),
            (Some(Added), Removed) => None,
            (Some(Added), _) => Some(Added),
            (Some(Removed), Removed) => Some(Removed),
            (Some(Removed), _) => Some(Changed),
            (Some(Changed), Removed) => Some(Removed),
            (Some(Changed), _) => Some(Changed),
        }
    }
}

/// An event record produced by every mutation to the city.
///
/// The log is enough to rebuild the grid without re-running the RNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CityEvent {
    BuildingPlaced { coord: GridCoord, building: Building },
    /// Carries the removed building so the log can be read backwards.
    BuildingRemoved { coord: GridCoord, building: Building },
    HeightChanged { coord: GridCoord, old: u32, new: u32 },
    /// Simulation advanced to `tick`.
    Ticked { tick: u64 },
}

/// The authoritative city grid.
///
/// Tiles are stored x-major (`x * size + y`), the order ticks walk them in.
/// Growth draws come from a seeded ChaCha8 stream: the same seed and sequence
/// of operations always produce the same city.
#[derive(Debug, Clone)]
pub struct City {
    size: u32,
    tiles: Vec<Tile>,
    tick: u64,
    seed: u64,
    rng: ChaCha8Rng,
    growth: GrowthConfig,
    pending: BTreeMap<GridCoord, TileDiff>,
    event_log: Vec<CityEvent>,
}

impl City {
    /// Create a `size × size` grid of empty grass tiles with seed 0.
    pub fn new(size: u32) -> Self {
        Self::with_seed(size, 0)
    }

    /// Create a grid with a specific RNG seed.
    pub fn with_seed(size: u32, seed: u64) -> Self {
        Self::with_growth(size, seed, GrowthConfig::default())
    }

    /// Create a grid from the game configuration.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::with_growth(config.grid_size, config.seed, config.growth.clone())
    }

    pub fn with_growth(size: u32, seed: u64, growth: GrowthConfig) -> Self {
        assert!(size >= 1, "city size must be at least 1");
        let mut tiles = Vec::with_capacity((size as usize) * (size as usize));
        for x in 0..size {
            for y in 0..size {
                tiles.push(Tile::new(GridCoord::new(x, y)));
            }
        }
        tracing::debug!(size, seed, "city initialized");
        Self {
            size,
            tiles,
            tick: 0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            growth,
            pending: BTreeMap::new(),
            event_log: Vec::new(),
        }
    }

    /// Side length of the grid.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn growth(&self) -> &GrowthConfig {
        &self.growth
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.size && coord.y < self.size
    }

    fn index(&self, coord: GridCoord) -> usize {
        assert!(
            self.contains(coord),
            "tile {coord} out of bounds for city of size {}",
            self.size
        );
        coord.x as usize * self.size as usize + coord.y as usize
    }

    /// Tile at `coord`. Panics when out of bounds.
    pub fn tile(&self, coord: GridCoord) -> &Tile {
        &self.tiles[self.index(coord)]
    }

    /// Tile at `coord`, or `None` when out of bounds.
    pub fn get(&self, coord: GridCoord) -> Option<&Tile> {
        if self.contains(coord) {
            Some(self.tile(coord))
        } else {
            None
        }
    }

    /// All tiles in x-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Occupied tiles and their buildings in x-major order.
    pub fn buildings(&self) -> impl Iterator<Item = (GridCoord, &Building)> {
        self.tiles
            .iter()
            .filter_map(|t| t.building.as_ref().map(|b| (t.coord, b)))
    }

    pub fn building_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_occupied()).count()
    }

    /// Set or clear the building on a tile. Returns the previous building.
    ///
    /// Placing a building always starts it at height 1. Panics when `coord`
    /// is out of bounds.
    pub fn set_building(&mut self, coord: GridCoord, kind: Option<BuildingKind>) -> Option<Building> {
        let idx = self.index(coord);
        let next = kind.map(Building::new);
        let previous = std::mem::replace(&mut self.tiles[idx].building, next);

        if let Some(building) = previous {
            self.event_log
                .push(CityEvent::BuildingRemoved { coord, building });
        }
        if let Some(building) = next {
            self.event_log
                .push(CityEvent::BuildingPlaced { coord, building });
        }

        let diff = match (previous, next) {
            (None, None) => None,
            (Some(_), None) => Some(TileDiff::Removed),
            (None, Some(_)) => Some(TileDiff::Added),
            (Some(_), Some(_)) => Some(TileDiff::Changed),
        };
        if let Some(diff) = diff {
            mark(&mut self.pending, coord, diff);
        }
        previous
    }

    /// Advance the simulation by one tick.
    ///
    /// Every growing building draws one uniform number: below
    /// `grow_probability` it gains a level, below `grow + shrink` it loses
    /// one (never dropping below 1). Either transition marks the tile changed.
    pub fn tick(&mut self) {
        self.tick += 1;
        let _span = tracing::trace_span!("city_tick", tick = self.tick).entered();

        let grow = self.growth.grow_probability;
        let shrink = grow + self.growth.shrink_probability;
        let mut transitions = 0usize;

        for tile in &mut self.tiles {
            let coord = tile.coord;
            let Some(building) = tile.building.as_mut() else {
                continue;
            };
            if !building.kind.grows() {
                continue;
            }

            let r: f64 = self.rng.gen_range(0.0..1.0);
            let old = building.height;
            if r < grow {
                building.height += 1;
            } else if r < shrink {
                building.height = old.saturating_sub(1).max(1);
            } else {
                continue;
            }

            let new = building.height;
            self.event_log
                .push(CityEvent::HeightChanged { coord, old, new });
            mark(&mut self.pending, coord, TileDiff::Changed);
            transitions += 1;
        }

        self.event_log.push(CityEvent::Ticked { tick: self.tick });
        tracing::trace!(transitions, "tick complete");
    }

    /// Drain pending tile diffs in coordinate order.
    ///
    /// The visual layer calls this once per sync; a second call returns
    /// nothing until the grid changes again.
    pub fn take_diff(&mut self) -> Vec<(GridCoord, TileDiff)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    /// Number of tiles with changes the visual layer has not consumed.
    pub fn pending_diff_count(&self) -> usize {
        self.pending.len()
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[CityEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<CityEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Rebuild a city from its event log.
    ///
    /// Tiles and tick count are reconstructed exactly. The RNG restarts from
    /// `seed`, so later ticks on the replayed city diverge from the original.
    pub fn replay(size: u32, seed: u64, events: &[CityEvent]) -> Self {
        let mut city = Self::with_seed(size, seed);
        for event in events {
            match event {
                CityEvent::BuildingPlaced { coord, building } => {
                    let idx = city.index(*coord);
                    city.tiles[idx].building = Some(*building);
                }
                CityEvent::BuildingRemoved { coord, .. } => {
                    let idx = city.index(*coord);
                    city.tiles[idx].building = None;
                }
                CityEvent::HeightChanged { coord, new, .. } => {
                    let idx = city.index(*coord);
                    if let Some(building) = city.tiles[idx].building.as_mut() {
                        building.height = *new;
                    }
                }
                CityEvent::Ticked { tick } => {
                    city.tick = *tick;
                }
            }
        }
        city
    }

    /// Deterministic FNV-1a hash of the tick count and every building.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut mix = |bytes: &[u8]| {
            for &b in bytes {
                h ^= b as u64;
                h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&self.size.to_le_bytes());
        mix(&self.tick.to_le_bytes());
        for (coord, building) in self.buildings() {
            mix(&coord.x.to_le_bytes());
            mix(&coord.y.to_le_bytes());
            mix(&[building.kind as u8]);
            mix(&building.height.to_le_bytes());
        }
        h
    }
}

fn mark(pending: &mut BTreeMap<GridCoord, TileDiff>, coord: GridCoord, diff: TileDiff) {
    match TileDiff::merge(pending.get(&coord).copied(), diff) {
        Some(merged) => {
            pending.insert(coord, merged);
        }
        None => {
            pending.remove(&coord);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::TerrainKind;

    fn always_grow() -> GrowthConfig {
        GrowthConfig {
            grow_probability: 1.0,
            shrink_probability: 0.0,
        }
    }

    fn always_shrink() -> GrowthConfig {
        GrowthConfig {
            grow_probability: 0.0,
            shrink_probability: 1.0,
        }
    }

    #[test]
    fn initialize_creates_empty_grass_grid() {
        for n in 1..=6 {
            let city = City::new(n);
            assert_eq!(city.tiles().count(), (n * n) as usize);
            assert!(city.tiles().all(|t| t.terrain == TerrainKind::Grass));
            assert!(city.tiles().all(|t| t.building.is_none()));
            assert_eq!(city.pending_diff_count(), 0);
        }
    }

    #[test]
    fn tiles_know_their_coordinates() {
        let city = City::new(4);
        for x in 0..4 {
            for y in 0..4 {
                let c = GridCoord::new(x, y);
                assert_eq!(city.tile(c).coord, c);
            }
        }
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn zero_size_panics() {
        let _ = City::new(0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_set_building_panics() {
        let mut city = City::new(3);
        city.set_building(GridCoord::new(3, 0), Some(BuildingKind::Road));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_tile_panics() {
        let city = City::new(2);
        let _ = city.tile(GridCoord::new(0, 2));
    }

    #[test]
    fn get_is_checked() {
        let city = City::new(2);
        assert!(city.get(GridCoord::new(1, 1)).is_some());
        assert!(city.get(GridCoord::new(2, 1)).is_none());
    }

    #[test]
    fn set_and_clear_building() {
        let mut city = City::new(2);
        let c = GridCoord::new(1, 0);
        assert!(city.set_building(c, Some(BuildingKind::Residential)).is_none());
        assert_eq!(city.tile(c).building, Some(Building::new(BuildingKind::Residential)));
        assert_eq!(city.building_count(), 1);

        let prev = city.set_building(c, None);
        assert_eq!(prev.map(|b| b.kind), Some(BuildingKind::Residential));
        assert!(city.tile(c).building.is_none());
    }

    #[test]
    fn unoccupied_tiles_unaffected_by_tick() {
        let mut city = City::with_growth(3, 1, always_grow());
        city.tick();
        assert_eq!(city.building_count(), 0);
        assert_eq!(city.pending_diff_count(), 0);
        assert_eq!(city.tick_count(), 1);
    }

    #[test]
    fn tick_grows_buildings() {
        let mut city = City::with_growth(1, 1, always_grow());
        let c = GridCoord::new(0, 0);
        city.set_building(c, Some(BuildingKind::Industrial));
        city.take_diff();
        for _ in 0..5 {
            city.tick();
        }
        assert_eq!(city.tile(c).building.unwrap().height, 6);
        assert_eq!(city.take_diff(), vec![(c, TileDiff::Changed)]);
    }

    #[test]
    fn height_never_drops_below_one() {
        let mut city = City::with_growth(2, 9, always_shrink());
        let c = GridCoord::new(1, 1);
        city.set_building(c, Some(BuildingKind::Commercial));
        for _ in 0..50 {
            city.tick();
            assert!(city.tile(c).building.unwrap().height >= 1);
        }
    }

    #[test]
    fn shrink_at_floor_still_marks_tile() {
        let mut city = City::with_growth(1, 9, always_shrink());
        let c = GridCoord::new(0, 0);
        city.set_building(c, Some(BuildingKind::Industrial));
        city.take_diff();
        city.tick();
        assert_eq!(city.take_diff(), vec![(c, TileDiff::Changed)]);
        assert_eq!(city.tile(c).building.unwrap().height, 1);
    }

    #[test]
    fn default_growth_keeps_height_positive() {
        let mut city = City::with_seed(4, 123);
        for x in 0..4 {
            city.set_building(GridCoord::new(x, x), Some(BuildingKind::Residential));
        }
        for _ in 0..2000 {
            city.tick();
        }
        assert!(city.buildings().all(|(_, b)| b.height >= 1));
    }

    #[test]
    fn roads_never_change() {
        let mut city = City::with_growth(1, 3, always_grow());
        let c = GridCoord::new(0, 0);
        city.set_building(c, Some(BuildingKind::Road));
        city.take_diff();
        for _ in 0..10 {
            city.tick();
        }
        assert_eq!(city.tile(c).building, Some(Building::new(BuildingKind::Road)));
        assert!(city.take_diff().is_empty());
    }

    #[test]
    fn diff_drained_exactly_once() {
        let mut city = City::new(3);
        city.set_building(GridCoord::new(0, 0), Some(BuildingKind::Road));
        city.set_building(GridCoord::new(2, 1), Some(BuildingKind::Residential));
        let diff = city.take_diff();
        assert_eq!(
            diff,
            vec![
                (GridCoord::new(0, 0), TileDiff::Added),
                (GridCoord::new(2, 1), TileDiff::Added),
            ]
        );
        assert!(city.take_diff().is_empty());
    }

    #[test]
    fn place_then_remove_cancels_out() {
        let mut city = City::new(1);
        let c = GridCoord::new(0, 0);
        city.set_building(c, Some(BuildingKind::Road));
        city.set_building(c, None);
        assert!(city.take_diff().is_empty());
        assert!(city.tile(c).building.is_none());
    }

    #[test]
    fn remove_then_place_is_a_change() {
        let mut city = City::new(1);
        let c = GridCoord::new(0, 0);
        city.set_building(c, Some(BuildingKind::Road));
        city.take_diff();
        city.set_building(c, None);
        city.set_building(c, Some(BuildingKind::Industrial));
        assert_eq!(city.take_diff(), vec![(c, TileDiff::Changed)]);
    }

    #[test]
    fn change_then_remove_is_a_removal() {
        let mut city = City::with_growth(1, 0, always_grow());
        let c = GridCoord::new(0, 0);
        city.set_building(c, Some(BuildingKind::Residential));
        city.take_diff();
        city.tick();
        city.set_building(c, None);
        assert_eq!(city.take_diff(), vec![(c, TileDiff::Removed)]);
    }

    #[test]
    fn added_then_changed_stays_added() {
        let mut city = City::with_growth(1, 0, always_grow());
        let c = GridCoord::new(0, 0);
        city.set_building(c, Some(BuildingKind::Residential));
        city.tick();
        assert_eq!(city.take_diff(), vec![(c, TileDiff::Added)]);
    }

    #[test]
    fn clearing_empty_tile_records_nothing() {
        let mut city = City::new(2);
        assert!(city.set_building(GridCoord::new(1, 1), None).is_none());
        assert!(city.take_diff().is_empty());
        assert!(city.events().is_empty());
    }

    #[test]
    fn same_seed_same_city() {
        let build = |seed| {
            let mut city = City::with_seed(5, seed);
            for x in 0..5 {
                for y in 0..5 {
                    city.set_building(GridCoord::new(x, y), Some(BuildingKind::Residential));
                }
            }
            for _ in 0..300 {
                city.tick();
            }
            city
        };
        assert_eq!(build(42).state_hash(), build(42).state_hash());
        assert_ne!(build(1).state_hash(), build(2).state_hash());
    }

    #[test]
    fn events_are_recorded() {
        let mut city = City::with_growth(1, 0, always_grow());
        let c = GridCoord::new(0, 0);
        city.set_building(c, Some(BuildingKind::Residential));
        city.tick();
        city.set_building(c, None);
        assert_eq!(
            city.events(),
            &[
                CityEvent::BuildingPlaced {
                    coord: c,
                    building: Building::new(BuildingKind::Residential)
                },
                CityEvent::HeightChanged { coord: c, old: 1, new: 2 },
                CityEvent::Ticked { tick: 1 },
                CityEvent::BuildingRemoved {
                    coord: c,
                    building: Building {
                        kind: BuildingKind::Residential,
                        height: 2
                    }
                },
            ]
        );
        assert_eq!(city.drain_events().len(), 4);
        assert!(city.events().is_empty());
    }

    #[test]
    fn replay_reconstructs_state() {
        let mut city = City::with_seed(6, 77);
        for i in 0..6 {
            city.set_building(GridCoord::new(i, 5 - i), Some(BuildingKind::Commercial));
        }
        city.set_building(GridCoord::new(0, 0), Some(BuildingKind::Road));
        for _ in 0..500 {
            city.tick();
        }
        city.set_building(GridCoord::new(2, 3), None);

        let replayed = City::replay(6, 77, city.events());
        assert_eq!(replayed.tick_count(), city.tick_count());
        assert_eq!(replayed.state_hash(), city.state_hash());
        assert_eq!(replayed.building_count(), city.building_count());
    }
}
