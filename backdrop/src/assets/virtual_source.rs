use std::collections::BTreeMap;

use super::container::{AssetSource, normalize_name};
use crate::core::error::Result;

pub const BLOOM_EFFECT_PATH: &str = "effects/wpenginelinux/bloomeffect.json";
pub const BLOOM_MODEL_PATH: &str = "models/wpenginelinux.json";
pub const BLOOM_MATERIAL_PATH: &str = "materials/wpenginelinux.json";

// Downsample -> blur -> combine back into the full frame buffer, so a scene
// image that references the model below gets a camera bloom without
// dedicated render code.
const BLOOM_EFFECT: &str = r#"{
	"name": "camerabloom_wpengine_linux",
	"group": "wpengine_linux_camera",
	"dependencies": [],
	"passes": [
		{
			"material": "materials/util/downsample_quarter_bloom.json",
			"target": "_rt_4FrameBuffer",
			"bind": [{ "name": "_rt_FullFrameBuffer", "index": 0 }]
		},
		{
			"material": "materials/util/downsample_eighth_blur_v.json",
			"target": "_rt_8FrameBuffer",
			"bind": [{ "name": "_rt_4FrameBuffer", "index": 0 }]
		},
		{
			"material": "materials/util/blur_h_bloom.json",
			"target": "_rt_Bloom",
			"bind": [{ "name": "_rt_8FrameBuffer", "index": 0 }]
		},
		{
			"material": "materials/util/combine.json",
			"target": "_rt_FullFrameBuffer",
			"bind": [
				{ "name": "_rt_imageLayerComposite_-1_a", "index": 0 },
				{ "name": "_rt_Bloom", "index": 1 }
			]
		}
	]
}"#;

const BLOOM_MODEL: &str = r#"{
	"material": "materials/wpenginelinux.json"
}"#;

const BLOOM_MATERIAL: &str = r#"{
	"passes": [
		{
			"blending": "normal",
			"cullmode": "nocull",
			"depthtest": "disabled",
			"depthwrite": "disabled",
			"shader": "genericimage2",
			"textures": ["_rt_FullFrameBuffer"]
		}
	]
}"#;

/// In-memory assets generated at startup.
#[derive(Debug, Default)]
pub struct VirtualSource {
    files: BTreeMap<String, Vec<u8>>,
}

impl VirtualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compatibility shims every container gets as its last layer.
    pub fn with_bloom_shims() -> Self {
        let mut source = Self::new();
        source.add(BLOOM_EFFECT_PATH, BLOOM_EFFECT);
        source.add(BLOOM_MODEL_PATH, BLOOM_MODEL);
        source.add(BLOOM_MATERIAL_PATH, BLOOM_MATERIAL);
        source
    }

    pub fn add(&mut self, name: &str, contents: impl Into<Vec<u8>>) {
        let name = normalize_name(name).unwrap_or_else(|_| name.to_string());
        self.files.insert(name, contents.into());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl AssetSource for VirtualSource {
    fn describe(&self) -> String {
        "virtual".to_string()
    }

    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.get(name).cloned())
    }
}
