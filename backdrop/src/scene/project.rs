use serde::Deserialize;
use serde_json::{Map, Value};

use super::property::{Property, PropertyError};
use crate::assets::container::AssetContainer;
use crate::core::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SceneKind {
    Scene,
    Video,
    Web,
    Other,
}

impl SceneKind {
    fn parse(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "scene" => Self::Scene,
            "video" => Self::Video,
            "web" => Self::Web,
            _ => Self::Other,
        }
    }
}

#[derive(Deserialize)]
struct RawProject {
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    file: String,
    #[serde(default)]
    workshopid: Value,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    general: RawGeneral,
}

#[derive(Default, Deserialize)]
struct RawGeneral {
    #[serde(default)]
    properties: Map<String, Value>,
}

/// A parsed background: its project description, exposed properties and
/// the container its assets resolve through.
pub struct Scene {
    title: String,
    kind: SceneKind,
    file: String,
    workshop_id: Option<String>,
    tags: Vec<String>,
    properties: Vec<Property>,
    container: AssetContainer,
}

impl Scene {
    /// Parses `root` from `container`. The container moves into the scene
    /// so the renderer can resolve the rest of the background through it.
    pub fn load(root: &str, container: AssetContainer) -> Result<Self> {
        if !container.exists(root) {
            return Err(Error::MissingDescriptor {
                name: root.to_string(),
                sources: container.source_names().join(", "),
            });
        }

        let json = container.read_to_string(root)?;
        let raw: RawProject = serde_json::from_str(&json)
            .map_err(|err| Error::Scene(format!("{}: {}", root, err)))?;

        let mut properties: Vec<Property> = raw
            .general
            .properties
            .iter()
            .filter_map(|(name, value)| Property::from_json(name, value))
            .collect();
        properties.sort_by(|a, b| {
            a.order().cmp(&b.order()).then_with(|| a.name().cmp(b.name()))
        });

        if !raw.file.is_empty() && !container.exists(&raw.file) {
            log::warn!(
                "background '{}' references missing entry file '{}'",
                raw.title,
                raw.file
            );
        }

        let workshop_id = match raw.workshopid {
            Value::String(id) if !id.is_empty() => Some(id),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        };

        Ok(Self {
            title: raw.title,
            kind: SceneKind::parse(&raw.kind),
            file: raw.file,
            workshop_id,
            tags: raw.tags,
            properties,
            container,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    /// Entry file of the background (scene graph, video, or page).
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn workshop_id(&self) -> Option<&str> {
        self.workshop_id.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn container(&self) -> &AssetContainer {
        &self.container
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Applies an override to the named property. `Ok(false)` means the
    /// scene has no such property.
    pub fn apply_override(
        &mut self,
        name: &str,
        raw: &str,
    ) -> std::result::Result<bool, PropertyError> {
        let Some(property) =
            self.properties.iter_mut().find(|p| p.name() == name)
        else {
            return Ok(false);
        };
        property.update(raw)?;
        Ok(true)
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("file", &self.file)
            .field("properties", &self.properties.len())
            .field("sources", &self.container.source_names())
            .finish()
    }
}
