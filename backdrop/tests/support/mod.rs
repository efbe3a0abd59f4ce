#![allow(dead_code)]

use std::any::Any;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use backdrop::assets::package::build_package;
use backdrop::core::error::{Error, Result};
use backdrop::core::settings::Settings;
use backdrop::drivers::fullscreen::FullscreenDetector;
use backdrop::drivers::input::{InputDriver, PointerState};
use backdrop::drivers::selector::{
    BackendFactory, FullscreenBackend, InputBackend, VideoBackend,
};
use backdrop::drivers::video::{
    Output, OutputViewport, VideoDriver, ViewportRect,
};
use backdrop::render::renderer::{
    Renderer, Scaling, Wallpaper, WallpaperHandle, Wallpapers,
};
use backdrop::runtime::context::FrameContext;
use backdrop::scene::project::Scene;

pub const PROJECT_JSON: &str = r#"{
    "title": "Fixture",
    "type": "scene",
    "file": "scene.json",
    "general": {
        "properties": {
            "bloom": {
                "type": "bool", "order": 0, "text": "Bloom", "value": true
            },
            "speed": {
                "type": "slider", "order": 1, "value": 1, "min": 0, "max": 4
            }
        }
    }
}"#;

/// Writes a background directory holding `project.json` and its entry file.
pub fn write_background(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("project.json"), PROJECT_JSON).unwrap();
    fs::write(dir.join("scene.json"), "{}").unwrap();
    dir
}

/// Writes a background whose files only live inside `scene.pkg`.
pub fn write_packaged_background(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let package = build_package(&[
        ("project.json", PROJECT_JSON.as_bytes()),
        ("scene.json", b"{}"),
    ]);
    fs::write(dir.join("scene.pkg"), package).unwrap();
    dir
}

/// Settings pointing every optional layer at paths that do not exist.
pub fn isolated_settings(root: &Path, background: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.general.default_background = background.to_path_buf();
    settings.general.assets = root.join("no-assets");
    settings.general.share_dir = root.join("no-share");
    settings.audio.enabled = false;
    settings.render.fullscreen_poll_ms = 0;
    settings
}

/// Deterministic RGB8 pixels, rows bottom-up like a GL readback.
pub fn viewport_pixels(viewport: &OutputViewport, seed: u8) -> Vec<u8> {
    let rect = viewport.rect;
    let mut out = Vec::with_capacity(rect.rgb_len());
    for y in 0..rect.height {
        for x in 0..rect.width {
            out.extend_from_slice(&[seed, x as u8, y as u8]);
        }
    }
    out
}

pub fn viewport(
    name: &str,
    x: i32,
    width: u32,
    height: u32,
    single: bool,
) -> OutputViewport {
    OutputViewport::new(name, ViewportRect::new(x, 0, width, height), single)
}

/// Everything the mocks record, shared with the test through `Rc`.
#[derive(Default)]
pub struct Probe {
    pub output: Output,
    pub frames: u64,
    pub dispatches: u32,
    pub made_current: Vec<String>,
    pub rendered: Vec<String>,
    pub paused_calls: Vec<bool>,
    pub fullscreen: bool,
    pub fullscreen_polls: u32,
    pub close_requested: bool,
    pub input_updates: u32,
    pub created: Vec<&'static str>,
    /// Closure run on every dispatch, e.g. to deliver a stop mid-tick.
    pub on_dispatch: Option<Box<dyn FnMut(&mut Probe)>>,
}

pub type SharedProbe = Rc<RefCell<Probe>>;

pub fn probe(output: Output) -> SharedProbe {
    Rc::new(RefCell::new(Probe {
        output,
        ..Probe::default()
    }))
}

pub fn single_output(width: u32, height: u32) -> Output {
    Output {
        viewports: vec![viewport("default", 0, width, height, false)],
        full_width: width,
        full_height: height,
        vflip: false,
    }
}

pub struct MockVideo {
    probe: SharedProbe,
    output: Output,
}

impl VideoDriver for MockVideo {
    fn dispatch_events(&mut self) {
        let mut probe = self.probe.borrow_mut();
        probe.dispatches += 1;
        if let Some(mut hook) = probe.on_dispatch.take() {
            hook(&mut *probe);
            probe.on_dispatch = Some(hook);
        }
    }

    fn close_requested(&self) -> bool {
        self.probe.borrow().close_requested
    }

    fn render_time(&self) -> f32 {
        self.probe.borrow().frames as f32 / 60.0
    }

    fn frame_counter(&self) -> u64 {
        self.probe.borrow().frames
    }

    fn output(&self) -> &Output {
        &self.output
    }

    fn make_current(&mut self, viewport: &OutputViewport) {
        self.probe.borrow_mut().made_current.push(viewport.name.clone());
    }

    fn present(&mut self) {
        self.probe.borrow_mut().frames += 1;
    }

    fn read_viewport_pixels(
        &mut self,
        viewport: &OutputViewport,
    ) -> Result<Vec<u8>> {
        let seed = self
            .output
            .viewports
            .iter()
            .position(|v| v.name == viewport.name)
            .ok_or_else(|| Error::Screenshot(viewport.name.clone()))?;
        Ok(viewport_pixels(viewport, seed as u8 + 1))
    }
}

pub struct MockInput(SharedProbe);

impl InputDriver for MockInput {
    fn update(&mut self) {
        self.0.borrow_mut().input_updates += 1;
    }

    fn pointer(&self) -> PointerState {
        PointerState::default()
    }
}

pub struct MockFullscreen(SharedProbe);

impl FullscreenDetector for MockFullscreen {
    fn any_fullscreen(&mut self) -> bool {
        let mut probe = self.0.borrow_mut();
        probe.fullscreen_polls += 1;
        probe.fullscreen
    }
}

pub struct MockWallpaper {
    title: String,
    scaling: Scaling,
}

impl Wallpaper for MockWallpaper {
    fn title(&self) -> &str {
        &self.title
    }

    fn scaling(&self) -> Scaling {
        self.scaling
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct MockRenderer {
    probe: SharedProbe,
    bindings: Vec<(String, WallpaperHandle)>,
}

impl Renderer for MockRenderer {
    fn create_wallpaper(
        &mut self,
        scene: &Scene,
        scaling: Scaling,
    ) -> Result<Box<dyn Wallpaper>> {
        Ok(Box::new(MockWallpaper {
            title: scene.title().to_string(),
            scaling,
        }))
    }

    fn set_wallpaper(&mut self, output: &str, handle: WallpaperHandle) {
        self.bindings.push((output.to_string(), handle));
    }

    fn render(
        &mut self,
        viewport: &OutputViewport,
        wallpapers: &mut Wallpapers,
        _frame: &FrameContext<'_>,
    ) {
        let bound = self
            .bindings
            .iter()
            .find(|(output, _)| *output == viewport.name)
            .or_else(|| self.bindings.first())
            .and_then(|(_, handle)| wallpapers.get_mut(*handle))
            .is_some();
        if bound {
            self.probe.borrow_mut().rendered.push(viewport.name.clone());
        }
    }

    fn set_paused(&mut self, paused: bool) {
        self.probe.borrow_mut().paused_calls.push(paused);
    }
}

/// Hands out mocks that all report into the same probe.
pub struct MockFactory {
    pub probe: SharedProbe,
    pub fail_video: bool,
}

impl MockFactory {
    pub fn new(probe: SharedProbe) -> Self {
        Self {
            probe,
            fail_video: false,
        }
    }
}

impl BackendFactory for MockFactory {
    fn create_video(
        &mut self,
        _backend: VideoBackend,
        _settings: &Settings,
    ) -> Result<Box<dyn VideoDriver>> {
        if self.fail_video {
            return Err(Error::backend("no display"));
        }
        self.probe.borrow_mut().created.push("video");
        let output = self.probe.borrow().output.clone();
        Ok(Box::new(MockVideo {
            probe: Rc::clone(&self.probe),
            output,
        }))
    }

    fn create_input(
        &mut self,
        _backend: InputBackend,
        _video: &dyn VideoDriver,
    ) -> Result<Box<dyn InputDriver>> {
        self.probe.borrow_mut().created.push("input");
        Ok(Box::new(MockInput(Rc::clone(&self.probe))))
    }

    fn create_fullscreen_detector(
        &mut self,
        _backend: FullscreenBackend,
        _video: &dyn VideoDriver,
    ) -> Result<Box<dyn FullscreenDetector>> {
        self.probe.borrow_mut().created.push("fullscreen");
        Ok(Box::new(MockFullscreen(Rc::clone(&self.probe))))
    }

    fn create_renderer(
        &mut self,
        _video: &mut dyn VideoDriver,
    ) -> Result<Box<dyn Renderer>> {
        self.probe.borrow_mut().created.push("renderer");
        Ok(Box::new(MockRenderer {
            probe: Rc::clone(&self.probe),
            bindings: Vec::new(),
        }))
    }
}

/// Video driver for screenshot tests: fixed output, no loop involvement.
pub struct StillVideo {
    pub output: Output,
    /// Per-viewport pixels, in the order rows come back from the backend.
    pub pixels: Vec<Vec<u8>>,
}

impl StillVideo {
    pub fn new(output: Output) -> Self {
        let pixels = output
            .viewports
            .iter()
            .enumerate()
            .map(|(i, v)| viewport_pixels(v, i as u8 + 1))
            .collect();
        Self { output, pixels }
    }
}

impl VideoDriver for StillVideo {
    fn dispatch_events(&mut self) {}

    fn close_requested(&self) -> bool {
        false
    }

    fn render_time(&self) -> f32 {
        0.0
    }

    fn frame_counter(&self) -> u64 {
        0
    }

    fn output(&self) -> &Output {
        &self.output
    }

    fn make_current(&mut self, _viewport: &OutputViewport) {}

    fn present(&mut self) {}

    fn read_viewport_pixels(
        &mut self,
        viewport: &OutputViewport,
    ) -> Result<Vec<u8>> {
        self.output
            .viewports
            .iter()
            .position(|v| v.name == viewport.name)
            .map(|i| self.pixels[i].clone())
            .ok_or_else(|| Error::Screenshot(viewport.name.clone()))
    }
}
