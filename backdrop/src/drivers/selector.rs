use std::env;
use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::fullscreen::{FullscreenDetector, NoopFullscreenDetector};
use super::input::InputDriver;
use super::video::VideoDriver;
use crate::core::error::{Error, Result};
use crate::core::settings::Settings;
use crate::io::audio::{
    AudioContext, AudioRecorder, LoopbackRecorder, NullRecorder,
};
use crate::render::renderer::Renderer;

pub const SESSION_TYPE_VAR: &str = "XDG_SESSION_TYPE";

#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Regular window, size picked by the backend.
    #[default]
    Windowed,
    /// Window with explicitly requested geometry.
    ExplicitWindow,
    /// Drawn behind the desktop on every configured screen.
    DesktopBackground,
}

impl RunMode {
    pub fn is_background(self) -> bool {
        self == Self::DesktopBackground
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionType {
    Wayland,
    X11,
    Unknown(String),
    Unset,
}

impl SessionType {
    pub fn detect() -> Self {
        Self::from_env_value(env::var(SESSION_TYPE_VAR).ok().as_deref())
    }

    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            None => Self::Unset,
            Some(value) if value.starts_with("wayland") => Self::Wayland,
            Some(value) if value.starts_with("x11") => Self::X11,
            Some(value) => Self::Unknown(value.to_string()),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wayland => write!(f, "wayland"),
            Self::X11 => write!(f, "x11"),
            Self::Unknown(value) => write!(f, "{}", value),
            Self::Unset => write!(f, "<unset>"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VideoBackend {
    /// Plain GPU window; works on any session.
    Windowed,
    /// Layer-shell surfaces per output.
    Wayland,
    /// Root-window drawing on an X server.
    X11,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputBackend {
    Windowed,
    Wayland,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FullscreenBackend {
    Wayland,
    X11,
    Noop,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AudioBackend {
    Loopback,
    Null,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BackendPlan {
    pub video: VideoBackend,
    pub input: InputBackend,
    pub fullscreen: FullscreenBackend,
    pub audio: AudioBackend,
}

/// Decides which implementation backs each capability.
pub fn select_backends(
    mode: RunMode,
    session: &SessionType,
    audio_enabled: bool,
) -> Result<BackendPlan> {
    debug!("Checking for window servers: session type {}", session);

    let (video, input) = if mode.is_background() {
        match session {
            SessionType::Wayland => {
                (VideoBackend::Wayland, InputBackend::Wayland)
            }
            SessionType::X11 => (VideoBackend::X11, InputBackend::Windowed),
            SessionType::Unset => return Err(Error::SessionUnset),
            SessionType::Unknown(value) => {
                return Err(Error::NoWindowServer(value.clone()));
            }
        }
    } else {
        (VideoBackend::Windowed, InputBackend::Windowed)
    };

    let fullscreen = match session {
        SessionType::Wayland => FullscreenBackend::Wayland,
        SessionType::X11 => FullscreenBackend::X11,
        _ => FullscreenBackend::Noop,
    };

    let audio = if audio_enabled {
        AudioBackend::Loopback
    } else {
        AudioBackend::Null
    };

    Ok(BackendPlan {
        video,
        input,
        fullscreen,
        audio,
    })
}

/// Supplied by the binary that links concrete window-system code. Each
/// method is called at most once per run, in declaration order.
pub trait BackendFactory {
    /// Creates the window(s) and graphics context(s).
    fn create_video(
        &mut self,
        backend: VideoBackend,
        settings: &Settings,
    ) -> Result<Box<dyn VideoDriver>>;

    fn create_input(
        &mut self,
        backend: InputBackend,
        video: &dyn VideoDriver,
    ) -> Result<Box<dyn InputDriver>>;

    /// Only called for [`FullscreenBackend::Wayland`] and
    /// [`FullscreenBackend::X11`].
    fn create_fullscreen_detector(
        &mut self,
        backend: FullscreenBackend,
        video: &dyn VideoDriver,
    ) -> Result<Box<dyn FullscreenDetector>>;

    /// Creates the scene renderer on top of the video driver's contexts.
    fn create_renderer(
        &mut self,
        video: &mut dyn VideoDriver,
    ) -> Result<Box<dyn Renderer>>;
}

/// The live backend set. Fields drop top to bottom, the reverse of
/// creation order.
pub struct Drivers {
    pub audio: AudioContext,
    pub fullscreen: Box<dyn FullscreenDetector>,
    pub input: Box<dyn InputDriver>,
    pub video: Box<dyn VideoDriver>,
}

impl Drivers {
    pub fn create(
        plan: BackendPlan,
        factory: &mut dyn BackendFactory,
        settings: &Settings,
    ) -> Result<Self> {
        info!(
            "Using video={:?} input={:?} fullscreen={:?} audio={:?}",
            plan.video, plan.input, plan.fullscreen, plan.audio
        );

        let video = factory.create_video(plan.video, settings)?;
        let input = factory.create_input(plan.input, video.as_ref())?;
        let fullscreen: Box<dyn FullscreenDetector> = match plan.fullscreen {
            FullscreenBackend::Noop => Box::new(NoopFullscreenDetector),
            backend => {
                factory.create_fullscreen_detector(backend, video.as_ref())?
            }
        };
        let recorder: Box<dyn AudioRecorder> = match plan.audio {
            AudioBackend::Loopback => {
                Box::new(LoopbackRecorder::start(&settings.audio))
            }
            AudioBackend::Null => {
                Box::new(NullRecorder::new(settings.audio.buffer_size))
            }
        };

        Ok(Self {
            audio: AudioContext::new(recorder),
            fullscreen,
            input,
            video,
        })
    }
}
