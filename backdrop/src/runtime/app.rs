use std::io::{self, Write};
use std::thread;

use log::{debug, error, info};

use super::context::FrameClock;
use super::loop_state::{LoopState, Transition};
use super::registry::{OverrideReport, WallpaperRegistry};
use super::signals;
use super::state::{RuntimeState, ScreenshotRequest, StopHandle};
use crate::core::error::{Error, Result};
use crate::core::settings::Settings;
use crate::drivers::selector::{
    BackendFactory, Drivers, SessionType, select_backends,
};
use crate::drivers::video::OutputViewport;
use crate::render::renderer::Renderer;
use crate::render::screenshot::{self, SaveOutcome};

/// Frames presented before a requested screenshot is taken, so the first
/// real frame has settled.
pub const SCREENSHOT_MIN_FRAMES: u64 = 5;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickOutcome {
    pub rendered: bool,
    pub paused: bool,
    pub captured: bool,
    pub stopped: bool,
}

impl TickOutcome {
    fn stopped() -> Self {
        Self {
            stopped: true,
            ..Self::default()
        }
    }
}

// Renderer before drivers: it draws into contexts the video driver owns.
struct Session {
    renderer: Box<dyn Renderer>,
    drivers: Drivers,
    // Refreshed only when the driver's output changes.
    viewports: Vec<OutputViewport>,
}

pub struct WallpaperApplication {
    settings: Settings,
    state: RuntimeState,
    loop_state: LoopState,
    clock: FrameClock,
    overrides: OverrideReport,
    // Declared before `session` so wallpapers drop ahead of the renderer.
    registry: WallpaperRegistry,
    session: Option<Session>,
}

impl WallpaperApplication {
    /// Loads every background and applies property overrides. No window
    /// or device is touched yet.
    pub fn new(settings: Settings) -> Result<Self> {
        let registry = WallpaperRegistry::load(&settings)?;
        Ok(Self::with_registry(settings, registry))
    }

    pub fn with_registry(
        settings: Settings,
        mut registry: WallpaperRegistry,
    ) -> Self {
        let overrides = registry.apply_overrides(
            &settings.general.properties,
            settings.general.only_list_properties,
        );

        let screenshot = if settings.screenshot.take {
            ScreenshotRequest::new(settings.screenshot.path.clone())
        } else {
            ScreenshotRequest::none()
        };

        Self {
            state: RuntimeState::new(screenshot),
            loop_state: LoopState::Running,
            clock: FrameClock::new(),
            overrides,
            registry,
            session: None,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &WallpaperRegistry {
        &self.registry
    }

    /// What the configured property overrides did at load time.
    pub fn override_report(&self) -> &OverrideReport {
        &self.overrides
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.state.stop.clone()
    }

    pub fn screenshot_pending(&self) -> bool {
        self.state.screenshot.is_pending()
    }

    /// True when the run only lists properties and never opens a window.
    pub fn is_list_only(&self) -> bool {
        self.settings.general.only_list_properties
    }

    /// Writes every property description collected in list-only mode.
    pub fn write_property_listing(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        for dump in &self.overrides.dumps {
            out.write_all(dump.as_bytes())?;
        }
        out.flush()
    }

    /// Creates the backends for the current session, wires signals and
    /// runs until stopped. In list-only mode the property listing goes to
    /// stdout and nothing else starts.
    pub fn show(&mut self, factory: &mut dyn BackendFactory) -> Result<()> {
        if self.is_list_only() {
            debug!("Property listing requested, not starting the renderer");
            self.write_property_listing(&mut io::stdout().lock())?;
            return Ok(());
        }

        self.start(factory, &SessionType::detect())?;
        signals::forward_termination(&self.state.stop)?;
        self.run()
    }

    /// Creates drivers and renderer and binds a wallpaper to every output.
    pub fn start(
        &mut self,
        factory: &mut dyn BackendFactory,
        session: &SessionType,
    ) -> Result<()> {
        let plan = select_backends(
            self.settings.render.mode,
            session,
            self.settings.audio.enabled,
        )?;
        let mut drivers = Drivers::create(plan, factory, &self.settings)?;
        let mut renderer = factory.create_renderer(drivers.video.as_mut())?;

        let scalings = &self.settings.general.screen_scalings;
        if let Err(err) =
            self.registry.instantiate(renderer.as_mut(), scalings)
        {
            self.registry.release_wallpapers();
            return Err(err);
        }

        let viewports = drivers.video.output().viewports.clone();
        self.session = Some(Session {
            renderer,
            drivers,
            viewports,
        });
        self.loop_state = LoopState::Running;
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        while !self.loop_state.is_stopped() {
            self.tick()?;
        }
        Ok(())
    }

    /// Advances the loop by one iteration.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.loop_state.is_stopped() {
            return Ok(TickOutcome::stopped());
        }

        let Some(session) = self.session.as_mut() else {
            return Err(Error::backend("main loop ticked before start"));
        };
        let Session {
            renderer,
            drivers,
            viewports,
        } = session;

        if !self.state.keep_running() || drivers.video.close_requested() {
            self.finish();
            return Ok(TickOutcome::stopped());
        }

        self.clock.advance(drivers.video.render_time());
        drivers.audio.update();
        drivers.input.update();

        if self.settings.render.pause_on_fullscreen {
            let fullscreen = drivers.fullscreen.any_fullscreen();
            match self.loop_state.observe_fullscreen(fullscreen) {
                Transition::Paused => {
                    info!("Fullscreen window detected, pausing");
                    renderer.set_paused(true);
                }
                Transition::Resumed => {
                    info!("No fullscreen window left, resuming");
                    renderer.set_paused(false);
                }
                _ => {}
            }

            if self.loop_state.is_paused() {
                drivers.video.dispatch_events();
                thread::sleep(self.settings.render.fullscreen_poll_interval());
                return Ok(TickOutcome {
                    paused: true,
                    ..TickOutcome::default()
                });
            }
        }

        drivers.video.dispatch_events();

        // A stop that arrived while dispatching skips the frame entirely.
        if !self.state.keep_running() || drivers.video.close_requested() {
            self.finish();
            return Ok(TickOutcome::stopped());
        }

        let current = &drivers.video.output().viewports;
        if *viewports != *current {
            viewports.clone_from(current);
        }

        let frame = self
            .clock
            .frame(drivers.input.pointer(), drivers.audio.samples());
        for viewport in viewports.iter() {
            drivers.video.make_current(viewport);
            renderer.render(viewport, self.registry.wallpapers_mut(), &frame);
        }
        drivers.video.present();

        let mut outcome = TickOutcome {
            rendered: true,
            ..TickOutcome::default()
        };

        let settled = drivers.video.frame_counter() >= SCREENSHOT_MIN_FRAMES;
        if let Some(path) = self.state.screenshot.take_if(settled) {
            let result = screenshot::capture(drivers.video.as_mut())
                .and_then(|bitmap| screenshot::save(&bitmap, &path));
            match result {
                Ok(SaveOutcome::Written(_)) => outcome.captured = true,
                Ok(SaveOutcome::Skipped) => {}
                Err(err) => {
                    error!("Cannot save screenshot {:?}: {}", path, err)
                }
            }
        }

        Ok(outcome)
    }

    // Stopped is terminal: wallpapers go first, then audio, then the
    // renderer and drivers.
    fn finish(&mut self) {
        self.loop_state.stop();
        self.state.stop.request_stop();
        info!("Stop requested");

        self.registry.release_wallpapers();
        if let Some(mut session) = self.session.take() {
            session.drivers.audio.shutdown();
        }
    }
}
