//! Input: pointer/keyboard state and the gesture routing that turns raw events
//! into high-level [`Action`]s.
//!
//! # Invariants
//! - Hosts feed raw events in; the camera and tools only ever see actions.
//! - Releasing any pointer button clears all button and modifier flags.

pub mod action;
mod state;

pub use action::Action;
pub use state::{CLICK_SLOP_PIXELS, InputState, Key, Modifiers, PointerButton};
