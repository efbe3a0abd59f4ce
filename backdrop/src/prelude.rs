pub use crate::assets::container::{AssetContainer, AssetSource};
pub use crate::assets::resolver::{load_background, setup_container};
pub use crate::core::error::{Error, Result};
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::core::settings::Settings;
pub use crate::drivers::fullscreen::FullscreenDetector;
pub use crate::drivers::input::{InputDriver, PointerState};
pub use crate::drivers::selector::{
    BackendFactory, FullscreenBackend, InputBackend, RunMode, SessionType,
    VideoBackend,
};
pub use crate::drivers::video::{
    Output, OutputViewport, VideoDriver, ViewportRect,
};
pub use crate::io::audio::AudioRecorder;
pub use crate::render::renderer::{
    Renderer, Scaling, Wallpaper, WallpaperHandle, Wallpapers,
};
pub use crate::runtime::app::{TickOutcome, WallpaperApplication};
pub use crate::runtime::context::FrameContext;
pub use crate::scene::project::Scene;
