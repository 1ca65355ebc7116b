use glam::Vec2;

/// A high-level action produced from raw pointer and keyboard input.
///
/// The camera rig and tool application consume actions, never raw events,
/// so every host (desktop window, scripted CLI) shares the same routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Rotate the camera around its look-at point by a pointer delta in pixels.
    Orbit(Vec2),
    /// Translate the look-at point by a pointer delta in pixels.
    Pan(Vec2),
    /// Change the orbit radius by a wheel delta.
    Zoom(f32),
    /// Apply the active tool to whatever lies under this pointer position.
    Select(Vec2),
    /// Drag-apply the active tool at this pointer position.
    Brush(Vec2),
    /// Input that maps to nothing.
    Noop,
}

impl Action {
    /// Whether this action moves the camera rather than touching the city.
    pub fn is_camera(&self) -> bool {
        matches!(self, Self::Orbit(_) | Self::Pan(_) | Self::Zoom(_))
    }

    /// Pointer position for tool actions.
    pub fn tool_position(&self) -> Option<Vec2> {
        match self {
            Self::Select(p) | Self::Brush(p) => Some(*p),
            _ => None,
        }
    }
}
