use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Coordinate of one tile in the city grid.
///
/// Ordered x-major so that `BTreeMap<GridCoord, _>` iterates columns first,
/// the same order the simulation walks the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: u32,
    pub y: u32,
}

impl GridCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// World-space centre of the tile on the ground plane (z = 0).
    pub fn center(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, 0.0)
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
