use crate::action::Action;
use glam::Vec2;

/// Pointer travel, in pixels, below which a press/release counts as a click.
pub const CLICK_SLOP_PIXELS: f32 = 5.0;

/// Pointer button, numbered the way DOM and most windowing toolkits number them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(u16),
}

impl PointerButton {
    pub fn from_id(id: u16) -> Self {
        match id {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            n => Self::Other(n),
        }
    }
}

/// Keys the routing cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Held to turn primary drags into pans.
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

/// Button, modifier and pointer state, recomputed on every event.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub primary_down: bool,
    pub middle_down: bool,
    pub secondary_down: bool,
    pub space_down: bool,
    pub modifiers: Modifiers,
    /// Where the current press started, cleared on release.
    pub down: Option<Vec2>,
    pub prev: Option<Vec2>,
    pub cur: Option<Vec2>,
    /// `cur - prev` from the last move.
    pub delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a button press. Shift + primary starts a brush stroke right away.
    pub fn pointer_down(
        &mut self,
        button: PointerButton,
        modifiers: Modifiers,
        pos: Vec2,
    ) -> Action {
        match button {
            PointerButton::Primary => self.primary_down = true,
            PointerButton::Middle => self.middle_down = true,
            PointerButton::Secondary => self.secondary_down = true,
            PointerButton::Other(id) => {
                tracing::debug!(id, "ignoring unmapped pointer button");
            }
        }
        // Modifiers latch on press and stay set until release.
        self.modifiers.ctrl |= modifiers.ctrl;
        self.modifiers.shift |= modifiers.shift;

        self.down = Some(pos);
        self.prev = Some(pos);
        self.cur = Some(pos);
        self.delta = Vec2::ZERO;

        if self.primary_down && self.modifiers.shift {
            Action::Brush(pos)
        } else {
            Action::Noop
        }
    }

    /// Record a release. A plain primary press that stayed within
    /// [`CLICK_SLOP_PIXELS`] of where it started is a click. Brush and pan
    /// chords (shift, ctrl, space) never click.
    pub fn pointer_up(&mut self, pos: Vec2) -> Action {
        self.cur = Some(pos);
        let chorded = self.modifiers.shift || self.modifiers.ctrl || self.space_down;
        let click = self.primary_down && !chorded && !self.moved();

        self.primary_down = false;
        self.middle_down = false;
        self.secondary_down = false;
        self.modifiers = Modifiers::default();
        self.down = None;

        if click { Action::Select(pos) } else { Action::Noop }
    }

    /// Record a pointer move and route the resulting drag.
    pub fn pointer_move(&mut self, pos: Vec2) -> Action {
        let prev = self.prev.unwrap_or(pos);
        self.cur = Some(pos);
        self.delta = pos - prev;
        let action = self.drag_action();
        self.prev = Some(pos);
        action
    }

    pub fn wheel(&mut self, delta: f32) -> Action {
        if delta == 0.0 {
            Action::Noop
        } else {
            Action::Zoom(delta)
        }
    }

    pub fn key(&mut self, key: Key, pressed: bool) {
        if key == Key::Space {
            self.space_down = pressed;
        }
    }

    /// Whether the pointer has travelled past the click slop since the press.
    pub fn moved(&self) -> bool {
        let (Some(down), Some(cur)) = (self.down, self.cur) else {
            return false;
        };
        let d = cur - down;
        d.x.abs() > CLICK_SLOP_PIXELS || d.y.abs() > CLICK_SLOP_PIXELS
    }

    /// Map the current buttons, modifiers and delta onto an action.
    ///
    /// - shift + primary: brush the active tool
    /// - secondary, or primary with ctrl or space held: pan
    /// - primary alone: orbit
    pub fn drag_action(&self) -> Action {
        if self.primary_down && self.modifiers.shift {
            return match self.cur {
                Some(p) => Action::Brush(p),
                None => Action::Noop,
            };
        }
        if self.delta == Vec2::ZERO {
            return Action::Noop;
        }
        if self.secondary_down || (self.primary_down && (self.modifiers.ctrl || self.space_down)) {
            return Action::Pan(self.delta);
        }
        if self.primary_down {
            return Action::Orbit(self.delta);
        }
        Action::Noop
    }
}
