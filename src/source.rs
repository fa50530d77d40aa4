//! Asset sources: where layer art bytes come from.
//!
//! The pipeline never fetches anything itself. It asks an [`AssetSource`] for
//! the bytes behind a catalog reference and decodes them into a [`Raster`] at
//! the working size. Two sources ship with the crate:
//!
//! - [`FilesystemAssetSource`]: reads references relative to an asset root
//! - [`InMemoryAssetSource`]: serves pre-registered bytes (tests, embedding)

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::LoadError;
use crate::raster::{Raster, SizePx};

/// Shared asset bytes.
pub type AssetBytes = Arc<Vec<u8>>;

/// Loads raw asset bytes by catalog reference.
pub trait AssetSource: Debug {
    /// Loads the bytes behind `reference`.
    fn load(&self, reference: &str) -> Result<AssetBytes, LoadError>;

    /// Human-readable name of the source, for logging.
    fn name(&self) -> &'static str;
}

/// Loads `reference` and decodes it into a raster of exactly `size`.
///
/// Art that does not match the working size is resampled, the same way a
/// canvas stretches an image drawn into a fixed destination rectangle.
pub fn load_raster(
    source: &dyn AssetSource,
    reference: &str,
    size: SizePx,
) -> Result<Raster, LoadError> {
    let bytes = source.load(reference)?;
    let raster = Raster::decode(&bytes).map_err(|e| LoadError::Decode {
        reference: reference.to_string(),
        message: e.to_string(),
    })?;
    if raster.dimensions() != size {
        log::debug!(
            "Resampling '{}' from {}x{} to {}x{}",
            reference,
            raster.width(),
            raster.height(),
            size.width,
            size.height
        );
    }
    Ok(raster.resized(size))
}

// ============================================================================
// Filesystem
// ============================================================================

/// Loads assets from files below a root directory.
///
/// References are resolved relative to the root; a leading `/` is ignored so
/// that web-style references (`/static/base-01.png`) work when the root is
/// the web root. References that would escape the root are reported as
/// [`LoadError::NotFound`].
#[derive(Debug)]
pub struct FilesystemAssetSource {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
}

impl FilesystemAssetSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let canonical_root = root.canonicalize().ok();
        Self {
            root,
            canonical_root,
        }
    }

    /// Returns the asset root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let relative = Path::new(reference.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }

        let full_path = self.root.join(relative);
        match (full_path.canonicalize(), &self.canonical_root) {
            (Ok(canonical), Some(root)) if canonical.starts_with(root) => Some(canonical),
            // Symlink pointing outside the root.
            (Ok(_), Some(_)) => None,
            _ => Some(full_path),
        }
    }
}

impl AssetSource for FilesystemAssetSource {
    fn load(&self, reference: &str) -> Result<AssetBytes, LoadError> {
        let path = self
            .resolve(reference)
            .ok_or_else(|| LoadError::NotFound(format!("{} (outside asset root)", reference)))?;

        std::fs::read(&path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(reference.to_string())
            } else {
                LoadError::LoadFailed {
                    reference: reference.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "FilesystemAssetSource"
    }
}

// ============================================================================
// In-Memory
// ============================================================================

/// Serves assets from a map of reference to bytes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAssetSource {
    assets: HashMap<String, AssetBytes>,
}

impl InMemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers bytes under a reference, replacing any previous entry.
    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(reference.into(), Arc::new(bytes));
    }

    /// Registers a raster encoded as PNG.
    pub fn insert_raster(
        &mut self,
        reference: impl Into<String>,
        raster: &Raster,
    ) -> Result<(), crate::error::RenderError> {
        self.insert(reference, raster.encode_png()?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetSource for InMemoryAssetSource {
    fn load(&self, reference: &str) -> Result<AssetBytes, LoadError> {
        self.assets
            .get(reference)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(reference.to_string()))
    }

    fn name(&self) -> &'static str {
        "InMemoryAssetSource"
    }
}
