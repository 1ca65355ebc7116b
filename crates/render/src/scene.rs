use crate::picking::{Aabb, Pickable};
use glam::Vec3;
use isocity_common::GridCoord;
use isocity_kernel::{Building, BuildingKind, City, TerrainKind, TileDiff};
use std::collections::BTreeMap;

/// Surface appearance of a visual element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Grass,
    Residential,
    Commercial,
    Industrial,
    Road,
}

impl Material {
    pub fn for_terrain(terrain: TerrainKind) -> Self {
        match terrain {
            TerrainKind::Grass => Self::Grass,
        }
    }

    pub fn for_building(kind: BuildingKind) -> Self {
        match kind {
            BuildingKind::Residential => Self::Residential,
            BuildingKind::Commercial => Self::Commercial,
            BuildingKind::Industrial => Self::Industrial,
            BuildingKind::Road => Self::Road,
        }
    }

    /// Linear RGBA base color.
    pub fn color(self) -> [f32; 4] {
        match self {
            Self::Grass => [0.0, 0.67, 0.0, 1.0],
            Self::Residential => [0.27, 0.6, 0.27, 1.0],
            Self::Commercial => [0.27, 0.4, 0.8, 1.0],
            Self::Industrial => [0.8, 0.67, 0.2, 1.0],
            Self::Road => [0.27, 0.27, 0.27, 1.0],
        }
    }

    /// Single-character glyph for text renderers.
    pub fn glyph(self) -> char {
        match self {
            Self::Grass => '.',
            Self::Residential => 'R',
            Self::Commercial => 'C',
            Self::Industrial => 'I',
            Self::Road => '#',
        }
    }
}

/// One box in the scene, tagged with the tile it represents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualElement {
    pub coord: GridCoord,
    /// Centre of the box.
    pub position: Vec3,
    pub scale: Vec3,
    pub material: Material,
}

impl VisualElement {
    /// Unit grass block with its top face at z = 0.
    pub fn terrain(coord: GridCoord, terrain: TerrainKind) -> Self {
        Self {
            coord,
            position: coord.center() - Vec3::new(0.0, 0.0, 0.5),
            scale: Vec3::ONE,
            material: Material::for_terrain(terrain),
        }
    }

    /// Box standing on the tile, as tall as the building's visual height.
    pub fn building(coord: GridCoord, building: &Building) -> Self {
        let h = building.visual_height();
        Self {
            coord,
            position: coord.center() + Vec3::new(0.0, 0.0, 0.5 * h),
            scale: Vec3::new(1.0, 1.0, h),
            material: Material::for_building(building.kind),
        }
    }
}

impl Pickable for VisualElement {
    fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.scale)
    }
}

/// Counts from one [`Scene::sync`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub added: usize,
    pub removed: usize,
    pub rebuilt: usize,
}

impl SyncStats {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.rebuilt == 0
    }
}

/// Visual representation of a city, reconciled against its tile diffs.
///
/// Terrain elements are static and built once. Building elements are only
/// reconstructed when the city reports a diff for their tile; drawing the
/// scene every frame never depends on that.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    size: u32,
    terrain: BTreeMap<GridCoord, VisualElement>,
    buildings: BTreeMap<GridCoord, VisualElement>,
}

impl Scene {
    /// Build terrain for every tile plus any buildings already standing.
    ///
    /// Consumes the city's pending diffs, since everything they describe is
    /// already reflected here.
    pub fn initialize(city: &mut City) -> Self {
        let mut scene = Self {
            size: city.size(),
            ..Self::default()
        };
        for tile in city.tiles() {
            scene
                .terrain
                .insert(tile.coord, VisualElement::terrain(tile.coord, tile.terrain));
            if let Some(building) = &tile.building {
                scene
                    .buildings
                    .insert(tile.coord, VisualElement::building(tile.coord, building));
            }
        }
        city.take_diff();
        tracing::debug!(
            terrain = scene.terrain.len(),
            buildings = scene.buildings.len(),
            "scene initialized"
        );
        scene
    }

    /// Drain the city's diffs and rebuild the affected building elements.
    pub fn sync(&mut self, city: &mut City) -> SyncStats {
        let _span = tracing::trace_span!("scene_sync").entered();
        let mut stats = SyncStats::default();

        for (coord, diff) in city.take_diff() {
            let building = city.tile(coord).building;
            match (diff, building) {
                (TileDiff::Removed, _) | (_, None) => {
                    if building.is_some() {
                        tracing::warn!(%coord, "removal diff for an occupied tile");
                    }
                    if self.buildings.remove(&coord).is_some() {
                        stats.removed += 1;
                    }
                }
                (TileDiff::Added | TileDiff::Changed, Some(building)) => {
                    let element = VisualElement::building(coord, &building);
                    match self.buildings.insert(coord, element) {
                        Some(_) => stats.rebuilt += 1,
                        None => stats.added += 1,
                    }
                }
            }
        }

        if !stats.is_empty() {
            tracing::debug!(
                added = stats.added,
                removed = stats.removed,
                rebuilt = stats.rebuilt,
                "scene synced"
            );
        }
        stats
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn terrain(&self) -> impl Iterator<Item = &VisualElement> {
        self.terrain.values()
    }

    pub fn buildings(&self) -> impl Iterator<Item = &VisualElement> {
        self.buildings.values()
    }

    pub fn terrain_at(&self, coord: GridCoord) -> Option<&VisualElement> {
        self.terrain.get(&coord)
    }

    pub fn building_at(&self, coord: GridCoord) -> Option<&VisualElement> {
        self.buildings.get(&coord)
    }

    /// Every element, terrain first.
    pub fn elements(&self) -> impl Iterator<Item = &VisualElement> {
        self.terrain.values().chain(self.buildings.values())
    }

    pub fn element_count(&self) -> usize {
        self.terrain.len() + self.buildings.len()
    }
}
