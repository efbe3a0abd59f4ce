use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::error::{Error, Result};

/// One layer of an [`AssetContainer`].
pub trait AssetSource {
    /// Short label used in diagnostics, e.g. `dir:/path`.
    fn describe(&self) -> String;

    fn exists(&self, name: &str) -> bool;

    /// Returns `Ok(None)` when this source does not hold `name`.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;
}

/// Layered virtual filesystem. Lookups walk the sources in insertion
/// order and the first source holding the name wins.
#[derive(Default)]
pub struct AssetContainer {
    sources: Vec<Box<dyn AssetSource>>,
}

impl AssetContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: impl AssetSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|source| source.describe()).collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        let Ok(name) = normalize_name(name) else {
            return false;
        };
        self.sources.iter().any(|source| source.exists(&name))
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let normalized = normalize_name(name)?;
        for source in &self.sources {
            if let Some(bytes) = source.read(&normalized)? {
                return Ok(bytes);
            }
        }
        Err(Error::AssetNotFound(normalized))
    }

    pub fn read_to_string(&self, name: &str) -> Result<String> {
        let bytes = self.read(name)?;
        String::from_utf8(bytes).map_err(|err| {
            Error::Scene(format!("'{}' is not valid UTF-8: {}", name, err))
        })
    }
}

/// Loose files under a root directory.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Fails when `root` is not an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(Error::asset_load(root, "not a directory")),
            Err(err) => Err(Error::asset_load(root, err)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirectorySource {
    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }

    fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::NotFound | ErrorKind::IsADirectory
                ) =>
            {
                Ok(None)
            }
            Err(_) if path.is_dir() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Canonical form for asset names: forward slashes, no leading `/` or
/// `./`, and no `..` components.
pub fn normalize_name(name: &str) -> Result<String> {
    let unified = name.replace('\\', "/");
    let mut parts = Vec::new();

    for part in unified.split('/') {
        match part {
            "" | "." => {}
            ".." => return Err(Error::InvalidAssetName(name.to_string())),
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidAssetName(name.to_string()));
    }

    Ok(parts.join("/"))
}
