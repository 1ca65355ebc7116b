//! wgpu render backend for the city scene.
//!
//! Every terrain block and building is drawn as one instance of a unit box,
//! scaled and translated per element and shaded with a single directional
//! light from above.
//!
//! # Invariants
//! - The backend reads the scene and camera only; it never touches the city.
//! - Instance data is rebuilt each frame from the scene, so GPU state never
//!   drifts from the visual elements.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
pub use mesh::{BoxInstance, HIGHLIGHT_TINT, build_instances};
