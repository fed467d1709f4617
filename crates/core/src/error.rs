use std::path::PathBuf;

use crate::assets::TextureSlot;

/// Result alias that carries the custom [`SceneError`] type.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Common error type for the core crate.
///
/// Only one-time setup can fail. Rejected input and animation re-entry are
/// ordinary outcomes and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The configuration parsed but holds a value the scene cannot run with.
    #[error("invalid configuration: {0}")]
    InvalidSetting(String),
    /// The model importer rejected a scene file.
    #[error("failed to import scene {path}: {message}")]
    SceneImport { path: PathBuf, message: String },
    /// An image backing a texture slot could not be decoded.
    #[error("failed to decode texture {slot:?} from {path}: {message}")]
    TextureDecode {
        slot: TextureSlot,
        path: PathBuf,
        message: String,
    },
    /// A texture slot was left without a handle.
    #[error("texture slot {0:?} has no loaded texture")]
    MissingTexture(TextureSlot),
}

impl SceneError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Whether the error belongs to the fatal asset-loading class that ends
    /// the session before the first frame.
    pub fn is_initialization_failure(&self) -> bool {
        matches!(
            self,
            Self::SceneImport { .. } | Self::TextureDecode { .. } | Self::MissingTexture(_)
        )
    }
}

impl From<&str> for SceneError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SceneError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
