use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories_next::{BaseDirs, ProjectDirs};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use crate::drivers::selector::RunMode;
use crate::render::renderer::Scaling;

/// Install-time location of the shader patches. Overridable at build time
/// through `BACKDROP_SHARE_DIR`.
pub const SHARE_DIR: &str = match option_env!("BACKDROP_SHARE_DIR") {
    Some(dir) => dir,
    None => "/usr/share/backdrop",
};

const DEFAULT_FULLSCREEN_POLL_MS: u64 = 250;
const DEFAULT_AUDIO_BUFFER_SIZE: usize = 1024;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub render: RenderSettings,
    pub audio: AudioSettings,
    pub screenshot: ScreenshotSettings,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub default_background: PathBuf,
    /// Output name -> background path. An empty path uses
    /// `default_background`.
    pub screen_backgrounds: IndexMap<String, PathBuf>,
    pub screen_scalings: IndexMap<String, Scaling>,
    /// Property name -> raw override value.
    pub properties: IndexMap<String, String>,
    pub only_list_properties: bool,
    pub assets: PathBuf,
    pub share_dir: PathBuf,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            default_background: PathBuf::new(),
            screen_backgrounds: IndexMap::new(),
            screen_scalings: IndexMap::new(),
            properties: IndexMap::new(),
            only_list_properties: false,
            assets: default_assets_dir(),
            share_dir: PathBuf::from(SHARE_DIR),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    pub mode: RunMode,
    pub pause_on_fullscreen: bool,
    pub fullscreen_poll_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RunMode::Windowed,
            pause_on_fullscreen: true,
            fullscreen_poll_ms: DEFAULT_FULLSCREEN_POLL_MS,
        }
    }
}

impl RenderSettings {
    pub fn fullscreen_poll_interval(&self) -> Duration {
        Duration::from_millis(self.fullscreen_poll_ms)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Enables system audio loopback capture.
    pub enabled: bool,
    /// Input device name. Empty picks a monitor source automatically.
    pub device: String,
    pub buffer_size: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            device: String::new(),
            buffer_size: DEFAULT_AUDIO_BUFFER_SIZE,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenshotSettings {
    pub take: bool,
    pub path: PathBuf,
}

impl Settings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yml::from_str(yaml)
            .map_err(|err| Error::Settings(err.to_string()))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|err| {
            Error::Settings(format!(
                "failed to read '{}': {}",
                path.display(),
                err
            ))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Loads `settings.yaml` from the user config directory, or defaults
    /// when the file does not exist.
    pub fn load_or_default() -> Result<Self> {
        match config_dir().map(|dir| dir.join("settings.yaml")) {
            Some(path) if path.exists() => Self::from_yaml_file(path),
            _ => Ok(Self::default()),
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "backdrop")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

fn default_assets_dir() -> PathBuf {
    BaseDirs::new()
        .map(|base| base.data_dir().join("backdrop").join("assets"))
        .unwrap_or_else(|| PathBuf::from("assets"))
}
