//! Game context: the single owner of city, scene, camera and input state.
//!
//! # Invariants
//! - No global state; hosts hold a [`GameContext`] and feed it events.
//! - Only tool application and the tick mutate the city.
//! - Every city mutation is followed by a scene sync before the next frame.

mod context;

pub use context::{GameContext, ToolApplication};
