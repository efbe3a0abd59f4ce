use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort startup. Everything recoverable is logged at the call
/// site and never reaches this type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The root scene descriptor was not found in any container layer.
    #[error("cannot find '{name}' in any of: {sources}")]
    MissingDescriptor { name: String, sources: String },

    /// A mandatory asset source could not be opened.
    #[error("cannot load assets from '{}': {reason}", path.display())]
    AssetLoad { path: PathBuf, reason: String },

    #[error("asset '{0}' not found")]
    AssetNotFound(String),

    #[error("invalid asset name '{0}'")]
    InvalidAssetName(String),

    #[error("malformed package '{}': {reason}", path.display())]
    Package { path: PathBuf, reason: String },

    #[error("malformed scene description: {0}")]
    Scene(String),

    #[error(
        "cannot read environment variable XDG_SESSION_TYPE, window server \
         detection failed. Please ensure proper values are set"
    )]
    SessionUnset,

    #[error(
        "cannot run in background mode, window server could not be \
         detected (XDG_SESSION_TYPE='{0}'). XDG_SESSION_TYPE must be \
         wayland or x11"
    )]
    NoWindowServer(String),

    #[error("backend initialization failed: {0}")]
    Backend(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("screenshot failed: {0}")]
    Screenshot(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn asset_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn package(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Package {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn backend(reason: impl ToString) -> Self {
        Self::Backend(reason.to_string())
    }

    /// True for the startup failures the process cannot continue past.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AssetNotFound(_) | Self::Screenshot(_))
    }
}
