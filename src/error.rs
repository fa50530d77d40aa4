//! Error types shared across the rendering pipeline.

use thiserror::Error;

/// Error returned when an asset reference cannot be turned into pixels.
///
/// The compositor never propagates this: a layer whose art fails to load is
/// skipped with a warning. It surfaces only from direct calls to an
/// [`AssetSource`](crate::AssetSource).
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Failed to load asset '{reference}': {message}")]
    LoadFailed { reference: String, message: String },

    #[error("Failed to decode asset '{reference}': {message}")]
    Decode { reference: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

/// Error raised while reading an asset catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to scan asset directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised by the render pipeline itself.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid working size {width}x{height}")]
    InvalidWorkingSize { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Error reported by an [`ExportHost`](crate::ExportHost).
#[derive(Error, Debug)]
pub enum HostError {
    /// The host declined the request (e.g. a blocked print window).
    #[error("Host refused the request: {0}")]
    Refused(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when handing an artifact to the host.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No sticker has been rendered yet")]
    NothingToExport,

    #[error("Could not hand off '{what}': {source}")]
    HostRefused {
        what: String,
        #[source]
        source: HostError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Error raised while loading a [`StudioConfig`](crate::StudioConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
