use crate::camera::OrbitCamera;
use crate::scene::Scene;
use isocity_common::GridCoord;

/// Renderer-agnostic interface for presenting a scene.
///
/// Renderers read the scene and camera and produce output. They never touch
/// the city; the scene is the only visual state.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, scene: &Scene, camera: &OrbitCamera) -> Self::Output;
}

/// Text renderer: a header plus a top-down character map of the scene.
///
/// Rows run from the far edge (`y = size - 1`) down to `y = 0`, so the map
/// reads like a plan view with +Y pointing up.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &OrbitCamera) -> String {
        let mut out = String::new();
        let size = scene.size();
        out.push_str(&format!(
            "=== Scene ({size}x{size}, {} elements, {} buildings) ===\n",
            scene.element_count(),
            scene.buildings().count()
        ));
        let eye = camera.position();
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) look_at=({:.1}, {:.1}, {:.1}) az={:.0} el={:.0} r={:.1}\n",
            eye.x,
            eye.y,
            eye.z,
            camera.look_at.x,
            camera.look_at.y,
            camera.look_at.z,
            camera.azimuth.to_degrees(),
            camera.elevation.to_degrees(),
            camera.radius
        ));

        for y in (0..size).rev() {
            for x in 0..size {
                let coord = GridCoord::new(x, y);
                let glyph = scene
                    .building_at(coord)
                    .or_else(|| scene.terrain_at(coord))
                    .map_or(' ', |e| e.material.glyph());
                out.push(glyph);
            }
            out.push('\n');
        }

        out
    }
}
