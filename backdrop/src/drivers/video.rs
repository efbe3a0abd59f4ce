use crate::core::error::Result;

/// Pixel rectangle of one output inside the desktop.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ViewportRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bytes an RGB8 readback of this rect occupies.
    pub fn rgb_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputViewport {
    /// Output key the wallpaper registry binds against.
    pub name: String,
    pub rect: ViewportRect,
    /// Set when the viewport is one monitor of a horizontally spanned
    /// desktop; screenshots tile these left to right.
    pub single: bool,
}

impl OutputViewport {
    pub fn new(
        name: impl Into<String>,
        rect: ViewportRect,
        single: bool,
    ) -> Self {
        Self {
            name: name.into(),
            rect,
            single,
        }
    }
}

/// What the video backend is currently presenting to.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Output {
    pub viewports: Vec<OutputViewport>,
    pub full_width: u32,
    pub full_height: u32,
    /// Readbacks already arrive top-down. When false they are bottom-up
    /// and the capture reverses the rows.
    pub vflip: bool,
}

/// Window/GPU context owner. Exactly one is live per process.
pub trait VideoDriver {
    /// Drains the platform event queue (close, resize, configure...).
    fn dispatch_events(&mut self);

    fn close_requested(&self) -> bool;

    /// Monotonic render clock in seconds.
    fn render_time(&self) -> f32;

    /// Frames presented since the driver was created.
    fn frame_counter(&self) -> u64;

    fn output(&self) -> &Output;

    /// Binds the graphics context backing `viewport`.
    fn make_current(&mut self, viewport: &OutputViewport);

    /// Swaps buffers for every viewport rendered this tick.
    fn present(&mut self);

    /// Makes the viewport's context current and reads its pixels as
    /// tightly packed RGB8, rows in the order the backend stores them.
    fn read_viewport_pixels(
        &mut self,
        viewport: &OutputViewport,
    ) -> Result<Vec<u8>>;
}
