//! Rendering core: orbit camera rig, ray picking, and the scene that mirrors
//! the city grid.
//!
//! # Invariants
//! - The renderer never mutates city state; the scene only drains tile diffs.
//! - Camera elevation stays in `[0, π/2]` and radius never drops below its minimum.
//! - Terrain elements are built once; building elements only on diffs.

pub mod camera;
pub mod picking;
mod renderer;
pub mod scene;

pub use camera::{OrbitCamera, Viewport};
pub use picking::{Aabb, Hit, Pickable, Ray, pick, pick_ray, screen_to_ray};
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{Material, Scene, SyncStats, VisualElement};
