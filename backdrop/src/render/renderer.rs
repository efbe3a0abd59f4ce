//! Contract between the orchestrator and the scene rendering engine.
//!
//! The engine itself lives outside this crate. It is handed scenes once at
//! startup, returns opaque wallpapers that the registry keeps, and is then
//! asked to draw one viewport at a time.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::drivers::video::OutputViewport;
use crate::runtime::context::FrameContext;
use crate::scene::project::Scene;

/// How a wallpaper is fitted into a viewport whose aspect ratio differs
/// from the scene's.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    /// Whatever the scene itself asks for.
    #[default]
    Default,
    Stretch,
    Fit,
    Fill,
}

/// A scene instantiated by the renderer.
pub trait Wallpaper {
    fn title(&self) -> &str;

    fn scaling(&self) -> Scaling;

    /// Lets the renderer recover its concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Index of a wallpaper inside [`Wallpapers`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct WallpaperHandle(usize);

impl WallpaperHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Default)]
pub struct Wallpapers {
    items: Vec<Box<dyn Wallpaper>>,
}

impl Wallpapers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, wallpaper: Box<dyn Wallpaper>) -> WallpaperHandle {
        self.items.push(wallpaper);
        WallpaperHandle(self.items.len() - 1)
    }

    pub fn get(&self, handle: WallpaperHandle) -> Option<&dyn Wallpaper> {
        self.items.get(handle.0).map(|w| w.as_ref())
    }

    pub fn get_mut(
        &mut self,
        handle: WallpaperHandle,
    ) -> Option<&mut (dyn Wallpaper + 'static)> {
        self.items.get_mut(handle.0).map(|w| w.as_mut())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every wallpaper. Handles handed out earlier become dangling
    /// and resolve to `None`.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

pub trait Renderer {
    fn create_wallpaper(
        &mut self,
        scene: &Scene,
        scaling: Scaling,
    ) -> Result<Box<dyn Wallpaper>>;

    /// Binds the wallpaper drawn on the output named `output`.
    fn set_wallpaper(&mut self, output: &str, handle: WallpaperHandle);

    /// Draws the wallpaper bound to `viewport`. The viewport's context is
    /// already current.
    fn render(
        &mut self,
        viewport: &OutputViewport,
        wallpapers: &mut Wallpapers,
        frame: &FrameContext<'_>,
    );

    /// Freezes or resumes animation clocks while the loop is paused.
    fn set_paused(&mut self, paused: bool);
}
