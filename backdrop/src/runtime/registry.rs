use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::assets::resolver::load_background;
use crate::core::error::Result;
use crate::core::settings::Settings;
use crate::render::renderer::{Renderer, Scaling, WallpaperHandle, Wallpapers};
use crate::scene::project::Scene;

/// Output key used when a single window shows one background.
pub const DEFAULT_OUTPUT: &str = "default";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OverrideReport {
    /// Property updates that took effect, counted per scene.
    pub applied: usize,
    /// Overrides whose value could not be parsed.
    pub rejected: Vec<String>,
    /// Override names no scene exposes.
    pub unknown: Vec<String>,
    /// Property listings, filled when listing was requested.
    pub dumps: Vec<String>,
}

/// Scenes keyed by output, and the wallpapers the renderer built from them.
#[derive(Default)]
pub struct WallpaperRegistry {
    scenes: IndexMap<String, Scene>,
    wallpapers: Wallpapers,
    bindings: IndexMap<String, WallpaperHandle>,
}

impl WallpaperRegistry {
    /// Loads every background the run mode calls for. Any failure is
    /// fatal.
    pub fn load(settings: &Settings) -> Result<Self> {
        let general = &settings.general;
        let mut scenes = IndexMap::new();

        if !settings.render.mode.is_background() {
            let scene = load_background(&general.default_background, settings)?;
            scenes.insert(DEFAULT_OUTPUT.to_string(), scene);
            return Ok(Self::from_scenes(scenes));
        }

        for (screen, path) in &general.screen_backgrounds {
            let path: &Path = if path.as_os_str().is_empty() {
                debug!("Screen {} has no background, using default", screen);
                &general.default_background
            } else {
                path
            };
            scenes.insert(screen.clone(), load_background(path, settings)?);
        }

        if scenes.is_empty() {
            warn!("No screens configured for background mode");
        }

        Ok(Self::from_scenes(scenes))
    }

    pub fn from_scenes(scenes: IndexMap<String, Scene>) -> Self {
        Self {
            scenes,
            ..Self::default()
        }
    }

    /// Applies property overrides to every scene. With `list_only` the
    /// report also carries every property's description.
    pub fn apply_overrides(
        &mut self,
        overrides: &IndexMap<String, String>,
        list_only: bool,
    ) -> OverrideReport {
        let mut report = OverrideReport::default();
        let mut matched: HashSet<&str> = HashSet::new();

        for (output, scene) in &mut self.scenes {
            for (name, raw) in overrides {
                match scene.apply_override(name, raw) {
                    Ok(true) => {
                        info!("Applying override value for {}", name);
                        matched.insert(name.as_str());
                        report.applied += 1;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        warn!("Cannot apply override on '{}': {}", output, err);
                        matched.insert(name.as_str());
                        report.rejected.push(name.clone());
                    }
                }
            }

            if list_only {
                for property in scene.properties() {
                    report.dumps.push(property.dump());
                }
            }
        }

        for name in overrides.keys() {
            if !matched.contains(name.as_str()) {
                warn!("No background exposes a property named '{}'", name);
                report.unknown.push(name.clone());
            }
        }

        report
    }

    /// Creates one wallpaper per scene and binds it to its output.
    pub fn instantiate(
        &mut self,
        renderer: &mut dyn Renderer,
        scalings: &IndexMap<String, Scaling>,
    ) -> Result<()> {
        for (output, scene) in &self.scenes {
            let scaling = scaling_for(scalings, output);
            let wallpaper = renderer.create_wallpaper(scene, scaling)?;
            let handle = self.wallpapers.insert(wallpaper);
            self.bindings.insert(output.clone(), handle);
            renderer.set_wallpaper(output, handle);
        }
        Ok(())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    pub fn scene(&self, output: &str) -> Option<&Scene> {
        self.scenes.get(output)
    }

    pub fn scenes(&self) -> impl Iterator<Item = (&str, &Scene)> {
        self.scenes.iter().map(|(key, scene)| (key.as_str(), scene))
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn handle(&self, output: &str) -> Option<WallpaperHandle> {
        self.bindings.get(output).copied()
    }

    pub fn wallpapers(&self) -> &Wallpapers {
        &self.wallpapers
    }

    pub fn wallpapers_mut(&mut self) -> &mut Wallpapers {
        &mut self.wallpapers
    }

    /// Drops runtime wallpapers ahead of the renderer that created them.
    pub fn release_wallpapers(&mut self) {
        self.bindings.clear();
        self.wallpapers.clear();
    }
}

/// Scaling configured for `output`, or the default.
pub fn scaling_for(
    scalings: &IndexMap<String, Scaling>,
    output: &str,
) -> Scaling {
    scalings.get(output).copied().unwrap_or_default()
}
