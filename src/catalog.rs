//! Asset catalog: which art is available for each layer category.
//!
//! A catalog is read-only input. It is usually parsed from the JSON manifest
//! served alongside the art, or built by scanning an asset directory laid out
//! as `<root>/<category>/<name>-<id>.png`.
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "base": [
//!     { "id": "01", "name": "base-01.png",
//!       "lineart": "base/base-01.png", "fondo": "base/base-fondo-01.png" }
//!   ],
//!   "meta": { "guide": "_shared/base-guia.png" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::layer::Category;

/// Directory (relative to the asset root) holding art shared by all layers.
const SHARED_DIR: &str = "_shared";
/// File name of the optional positioning guide inside [`SHARED_DIR`].
const GUIDE_FILE: &str = "base-guia.png";
/// Marker that distinguishes fill art from outline art in file names.
const FILL_MARKER: &str = "-fondo-";

// ============================================================================
// LayerAsset
// ============================================================================

/// One selectable option within a category (e.g. one pair of eyes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct LayerAsset {
    /// Identifier, unique within its category.
    pub id: String,

    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Line art drawn untouched on top of the fill.
    #[serde(rename = "lineart", default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,

    /// Fill art, the part that receives the tint.
    #[serde(rename = "fondo", default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

impl LayerAsset {
    /// Creates an asset with outline art only.
    pub fn new(id: impl Into<String>, outline: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            outline: Some(outline.into()),
            fill: None,
        }
    }

    /// Sets the fill art reference.
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name to show for this asset: the explicit name, else the file name of
    /// the outline art, else the file name of the fill art, else the id.
    pub fn display_name(&self) -> &str {
        if let Some(name) = &self.name {
            return name;
        }
        self.outline
            .as_deref()
            .or(self.fill.as_deref())
            .and_then(|r| r.rsplit('/').next())
            .unwrap_or(self.id.as_str())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Wire shape of the manifest: one array per category plus `meta`.
#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    meta: serde_json::Value,

    #[serde(flatten)]
    categories: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ManifestMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    guide: Option<String>,
}

/// Available art per category, plus an optional shared guide image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    assets: BTreeMap<Category, Vec<LayerAsset>>,
    guide: Option<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an asset to a category.
    pub fn add(&mut self, category: Category, asset: LayerAsset) {
        self.assets.entry(category).or_default().push(asset);
    }

    /// Sets the shared guide reference.
    pub fn set_guide(&mut self, guide: Option<String>) {
        self.guide = guide;
    }

    /// Builder form of [`Catalog::add`].
    pub fn with(mut self, category: Category, asset: LayerAsset) -> Self {
        self.add(category, asset);
        self
    }

    /// The shared guide reference, if any.
    pub fn guide(&self) -> Option<&str> {
        self.guide.as_deref()
    }

    /// Assets available for a category, in catalog order.
    pub fn assets(&self, category: Category) -> &[LayerAsset] {
        self.assets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Looks up an asset by id within a category.
    pub fn find(&self, category: Category, id: &str) -> Option<&LayerAsset> {
        self.assets(category).iter().find(|a| a.id == id)
    }

    /// The first asset of a category, which is the default selection.
    pub fn first(&self, category: Category) -> Option<&LayerAsset> {
        self.assets(category).first()
    }

    /// Total number of assets across all categories.
    pub fn len(&self) -> usize {
        self.assets.values().map(Vec::len).sum()
    }

    /// Returns true if no category has any asset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses a JSON manifest.
    ///
    /// Only presence is checked: unknown top-level keys are ignored and
    /// entries that are not valid assets are skipped with a warning.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        let mut catalog = Catalog::new();
        catalog.guide = match manifest.meta {
            serde_json::Value::Null => None,
            meta => match serde_json::from_value::<ManifestMeta>(meta) {
                Ok(meta) => meta.guide,
                Err(e) => {
                    log::warn!("Ignoring malformed catalog meta: {}", e);
                    None
                }
            },
        };

        for (key, value) in manifest.categories {
            let Some(category) = Category::from_key(&key) else {
                log::debug!("Ignoring unknown catalog key '{}'", key);
                continue;
            };
            let serde_json::Value::Array(entries) = value else {
                log::warn!("Catalog entry '{}' is not a list, skipping", key);
                continue;
            };
            for entry in entries {
                match serde_json::from_value::<LayerAsset>(entry) {
                    Ok(asset) => catalog.add(category, asset),
                    Err(e) => log::warn!("Skipping malformed '{}' asset: {}", key, e),
                }
            }
        }

        Ok(catalog)
    }

    /// Serializes the catalog back to the manifest format.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let mut root = serde_json::Map::new();
        for (category, assets) in &self.assets {
            root.insert(category.key().to_string(), serde_json::to_value(assets)?);
        }
        let meta = ManifestMeta {
            guide: self.guide.clone(),
        };
        root.insert("meta".to_string(), serde_json::to_value(meta)?);
        Ok(serde_json::to_string(&root)?)
    }

    /// Builds a catalog from an asset directory.
    ///
    /// For every category, `<root>/<key>/*.png` is read. Files are grouped by
    /// the number after their last `-` (`base-02.png` and `base-fondo-02.png`
    /// are both id `02`); names containing `-fondo-` become the fill art and
    /// the rest become the outline art and display name. Items are ordered by
    /// id. `<root>/_shared/base-guia.png`, when present, becomes the guide.
    /// All references are relative to `root` with `/` separators.
    pub fn scan_dir(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let root = root.as_ref();
        let mut catalog = Catalog::new();

        for category in Category::ALL {
            let folder = root.join(category.key());
            if !folder.is_dir() {
                continue;
            }

            let mut names: Vec<String> = std::fs::read_dir(&folder)?
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.ends_with(".png"))
                .collect();
            names.sort();

            let mut grouped: BTreeMap<String, LayerAsset> = BTreeMap::new();
            for name in names {
                let id = asset_id(&name).unwrap_or(&name).to_string();
                let reference = format!("{}/{}", category.key(), name);
                let asset = grouped.entry(id.clone()).or_insert_with(|| LayerAsset {
                    id,
                    name: None,
                    outline: None,
                    fill: None,
                });
                if name.contains(FILL_MARKER) {
                    asset.fill = Some(reference);
                } else {
                    asset.outline = Some(reference);
                    asset.name = Some(name);
                }
            }

            log::debug!("Found {} '{}' assets", grouped.len(), category.key());
            for asset in grouped.into_values() {
                catalog.add(category, asset);
            }
        }

        if root.join(SHARED_DIR).join(GUIDE_FILE).is_file() {
            catalog.guide = Some(format!("{}/{}", SHARED_DIR, GUIDE_FILE));
        }

        Ok(catalog)
    }
}

/// Extracts the trailing number of `name-NN.png`, if there is one.
fn asset_id(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(".png")?;
    let (_, id) = stem.rsplit_once('-')?;
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
}
