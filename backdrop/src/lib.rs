//! Orchestration for animated desktop backgrounds: resolves each
//! background's assets, picks the window-system backends for the session,
//! and drives the per-frame loop that feeds an external scene renderer.

pub mod assets;
pub mod core;
pub mod drivers;
pub mod io;
pub mod prelude;
pub mod render;
pub mod runtime;
pub mod scene;

pub use runtime::app::{TickOutcome, WallpaperApplication};
