use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::container::{AssetContainer, DirectorySource};
use super::package::PackageSource;
use super::virtual_source::VirtualSource;
use crate::core::error::Result;
use crate::core::settings::Settings;
use crate::scene::project::Scene;

/// Root scene descriptor every background must provide.
pub const PROJECT_DESCRIPTOR: &str = "project.json";

/// Package archives probed inside a background directory, in priority
/// order.
pub const PACKAGE_NAMES: [&str; 2] = ["scene.pkg", "gifscene.pkg"];

pub const RELATIVE_SHARE_DIR: &str = "../share/";

/// Layers that could not be added. None of these stop loading.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Degraded {
    AssetsDirMissing(PathBuf),
    ShaderPatchesMissing,
    PackageUnreadable(PathBuf),
}

pub struct Resolution {
    pub container: AssetContainer,
    pub degraded: Vec<Degraded>,
}

/// Builds the layered container for one background. Only the background
/// directory itself is mandatory.
pub fn setup_container(
    background: &Path,
    settings: &Settings,
) -> Result<Resolution> {
    setup_container_with_share(
        background,
        settings,
        Path::new(RELATIVE_SHARE_DIR),
    )
}

pub(crate) fn setup_container_with_share(
    background: &Path,
    settings: &Settings,
    relative_share: &Path,
) -> Result<Resolution> {
    let mut container = AssetContainer::new();
    let mut degraded = Vec::new();

    container.add(DirectorySource::open(background)?);

    for name in PACKAGE_NAMES {
        let path = background.join(name);
        match PackageSource::open_optional(&path) {
            Ok(Some(package)) => {
                debug!(
                    "loaded package '{}' ({} entries)",
                    path.display(),
                    package.len()
                );
                container.add(package);
            }
            Ok(None) => {}
            Err(err) => {
                warn!("ignoring unreadable package: {}", err);
                degraded.push(Degraded::PackageUnreadable(path));
            }
        }
    }

    match DirectorySource::open(&settings.general.assets) {
        Ok(assets) => container.add(assets),
        Err(err) => {
            warn!(
                "Cannot find a valid assets folder, resolved to '{}': {}",
                settings.general.assets.display(),
                err
            );
            degraded.push(Degraded::AssetsDirMissing(
                settings.general.assets.clone(),
            ));
        }
    }

    let relative = DirectorySource::open(relative_share)
        .map(|dir| container.add(dir))
        .is_ok();
    let absolute = DirectorySource::open(&settings.general.share_dir)
        .map(|dir| container.add(dir))
        .is_ok();

    if !relative && !absolute {
        warn!(
            "Shader patches directory cannot be found, this might make some \
             backgrounds not work properly"
        );
        degraded.push(Degraded::ShaderPatchesMissing);
    }

    container.add(VirtualSource::with_bloom_shims());

    Ok(Resolution {
        container,
        degraded,
    })
}

/// Resolves the container for `background` and parses its project
/// description.
pub fn load_background(
    background: &Path,
    settings: &Settings,
) -> Result<Scene> {
    let resolution = setup_container(background, settings)?;
    let scene = Scene::load(PROJECT_DESCRIPTOR, resolution.container)?;
    debug!(
        "loaded background '{}' from {}",
        scene.title(),
        background.display()
    );
    Ok(scene)
}
