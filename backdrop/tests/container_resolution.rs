mod support;

use std::fs;

use backdrop::assets::resolver::{Degraded, load_background, setup_container};
use backdrop::assets::virtual_source::{
    BLOOM_EFFECT_PATH, BLOOM_MATERIAL_PATH, BLOOM_MODEL_PATH,
};
use backdrop::core::error::Error;
use backdrop::drivers::selector::RunMode;
use backdrop::runtime::registry::{DEFAULT_OUTPUT, WallpaperRegistry};

#[test]
fn direct_directory_is_enough() {
    let root = tempfile::tempdir().unwrap();
    let background = support::write_background(root.path(), "bg");
    let settings = support::isolated_settings(root.path(), &background);

    let resolution = setup_container(&background, &settings).unwrap();

    assert!(resolution.container.exists("project.json"));
    let assets = settings.general.assets.clone();
    assert!(resolution.degraded.contains(&Degraded::AssetsDirMissing(assets)));
    assert!(resolution.degraded.contains(&Degraded::ShaderPatchesMissing));

    let scene = load_background(&background, &settings).unwrap();
    assert_eq!(scene.title(), "Fixture");
}

#[test]
fn package_only_background_loads_without_global_assets() {
    let root = tempfile::tempdir().unwrap();
    let background = support::write_packaged_background(root.path(), "bg");
    let settings = support::isolated_settings(root.path(), &background);

    let scene = load_background(&background, &settings).unwrap();

    assert_eq!(scene.title(), "Fixture");
    assert!(scene.container().exists("scene.json"));
    let sources = scene.container().source_names();
    assert!(sources.iter().any(|name| name.starts_with("pkg:")));
    assert_eq!(sources.last().map(String::as_str), Some("virtual"));
}

#[test]
fn layers_resolve_in_priority_order() {
    let root = tempfile::tempdir().unwrap();
    let background = support::write_packaged_background(root.path(), "bg");
    fs::write(background.join("scene.json"), r#"{"from":"dir"}"#).unwrap();

    let assets = root.path().join("assets");
    fs::create_dir_all(assets.join("models")).unwrap();
    fs::write(assets.join("models/wpenginelinux.json"), r#"{"from":"assets"}"#)
        .unwrap();

    let mut settings = support::isolated_settings(root.path(), &background);
    settings.general.assets = assets;

    let resolution = setup_container(&background, &settings).unwrap();
    let container = &resolution.container;

    assert_eq!(
        container.read_to_string("scene.json").unwrap(),
        r#"{"from":"dir"}"#
    );
    assert_eq!(
        container.read_to_string(BLOOM_MODEL_PATH).unwrap(),
        r#"{"from":"assets"}"#
    );
    assert!(container.exists(BLOOM_EFFECT_PATH));
    assert!(container.exists(BLOOM_MATERIAL_PATH));
    assert!(
        !resolution
            .degraded
            .iter()
            .any(|d| matches!(d, Degraded::AssetsDirMissing(_)))
    );
}

#[test]
fn install_share_dir_satisfies_shader_patches() {
    let root = tempfile::tempdir().unwrap();
    let background = support::write_background(root.path(), "bg");
    let mut settings = support::isolated_settings(root.path(), &background);
    settings.general.share_dir = root.path().join("share");
    fs::create_dir_all(&settings.general.share_dir).unwrap();

    let resolution = setup_container(&background, &settings).unwrap();

    assert!(!resolution.degraded.contains(&Degraded::ShaderPatchesMissing));
}

#[test]
fn corrupt_package_is_skipped() {
    let root = tempfile::tempdir().unwrap();
    let background = support::write_background(root.path(), "bg");
    fs::write(background.join("gifscene.pkg"), b"\x04\0\0\0nope").unwrap();
    let settings = support::isolated_settings(root.path(), &background);

    let resolution = setup_container(&background, &settings).unwrap();

    let package = background.join("gifscene.pkg");
    let unreadable = Degraded::PackageUnreadable(package);
    assert!(resolution.degraded.contains(&unreadable));
    assert!(resolution.container.exists("project.json"));
}

#[test]
fn missing_background_directory_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let background = root.path().join("absent");
    let settings = support::isolated_settings(root.path(), &background);

    let err = setup_container(&background, &settings).err().unwrap();
    assert!(matches!(err, Error::AssetLoad { .. }));
}

#[test]
fn missing_descriptor_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let background = root.path().join("empty");
    fs::create_dir_all(&background).unwrap();
    let settings = support::isolated_settings(root.path(), &background);

    let err = load_background(&background, &settings).unwrap_err();
    assert!(matches!(err, Error::MissingDescriptor { .. }));
}

#[test]
fn windowed_modes_load_a_single_default_entry() {
    let root = tempfile::tempdir().unwrap();
    let background = support::write_background(root.path(), "bg");

    for mode in [RunMode::Windowed, RunMode::ExplicitWindow] {
        let mut settings = support::isolated_settings(root.path(), &background);
        settings.render.mode = mode;
        settings
            .general
            .screen_backgrounds
            .insert("DP-1".to_string(), background.clone());

        let registry = WallpaperRegistry::load(&settings).unwrap();
        let outputs: Vec<_> = registry.outputs().collect();
        assert_eq!(outputs, vec![DEFAULT_OUTPUT]);
    }
}

#[test]
fn background_mode_loads_one_scene_per_screen() {
    let root = tempfile::tempdir().unwrap();
    let default = support::write_background(root.path(), "default");
    let other = support::write_packaged_background(root.path(), "other");

    let mut settings = support::isolated_settings(root.path(), &default);
    settings.render.mode = RunMode::DesktopBackground;
    let screens = &mut settings.general.screen_backgrounds;
    screens.insert("HDMI-A-1".to_string(), Default::default());
    screens.insert("DP-1".to_string(), other.clone());

    let registry = WallpaperRegistry::load(&settings).unwrap();

    let outputs: Vec<_> = registry.outputs().collect();
    assert_eq!(outputs, vec!["HDMI-A-1", "DP-1"]);

    let describes = |output: &str, prefix: &str| {
        registry
            .scene(output)
            .map(|scene| scene.container().source_names())
            .is_some_and(|names| names.iter().any(|n| n.starts_with(prefix)))
    };
    assert!(describes("HDMI-A-1", &format!("dir:{}", default.display())));
    assert!(describes("DP-1", "pkg:"));
}

#[test]
fn background_mode_fails_on_any_broken_screen() {
    let root = tempfile::tempdir().unwrap();
    let default = support::write_background(root.path(), "default");

    let mut settings = support::isolated_settings(root.path(), &default);
    settings.render.mode = RunMode::DesktopBackground;
    settings
        .general
        .screen_backgrounds
        .insert("DP-1".to_string(), root.path().join("gone"));

    assert!(WallpaperRegistry::load(&settings).is_err());
}
