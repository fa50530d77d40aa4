//! Studio configuration.
//!
//! Every knob of the pipeline lives in [`StudioConfig`], which round-trips
//! through camelCase JSON. Missing fields take their defaults, so an empty
//! object is a valid configuration.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "workingSize": 1024,
//!   "outlinePx": 3,
//!   "includeGuide": true,
//!   "tintRules": [
//!     { "target": "espalda", "source": "peinado",
//!       "transform": { "type": "darken", "amount": 0.07 } }
//!   ],
//!   "companionRules": [{ "target": "espalda", "source": "peinado" }],
//!   "sheet": { "rows": 4, "columns": 3 },
//!   "downloadFilename": "sticker-outline.png"
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layer::{Category, CompanionRule, PlanRules, TintRule};
use crate::raster::SizePx;
use crate::sticker::SheetConfig;

/// Side of the square working canvas every layer is drawn at.
pub const DEFAULT_WORKING_SIZE: u32 = 1024;

/// Width of each outline ring, in pixels.
pub const DEFAULT_OUTLINE_PX: u32 = 3;

fn default_working_size() -> u32 {
    DEFAULT_WORKING_SIZE
}

fn default_outline_px() -> u32 {
    DEFAULT_OUTLINE_PX
}

fn default_render_order() -> Vec<Category> {
    Category::RENDER_ORDER.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_download_filename() -> String {
    "sticker-outline.png".to_string()
}

fn default_print_title() -> String {
    "Sticker sheet".to_string()
}

/// Settings for a [`StickerStudio`](crate::StickerStudio) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct StudioConfig {
    /// Side of the square working canvas.
    #[serde(default = "default_working_size")]
    pub working_size: u32,

    /// Width of each of the two outline rings.
    #[serde(default = "default_outline_px")]
    pub outline_px: u32,

    /// Categories in drawing order, bottom first. Categories left out are
    /// never drawn.
    #[serde(default = "default_render_order")]
    pub render_order: Vec<Category>,

    /// Whether the catalog's shared guide is drawn beneath the layers.
    #[serde(default = "default_true")]
    pub include_guide: bool,

    #[serde(default = "TintRule::defaults")]
    pub tint_rules: Vec<TintRule>,

    #[serde(default = "CompanionRule::defaults")]
    pub companion_rules: Vec<CompanionRule>,

    #[serde(default)]
    pub sheet: SheetConfig,

    /// File name the transparent sticker is saved under.
    #[serde(default = "default_download_filename")]
    pub download_filename: String,

    /// Title of the print surface.
    #[serde(default = "default_print_title")]
    pub print_title: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            working_size: DEFAULT_WORKING_SIZE,
            outline_px: DEFAULT_OUTLINE_PX,
            render_order: default_render_order(),
            include_guide: true,
            tint_rules: TintRule::defaults(),
            companion_rules: CompanionRule::defaults(),
            sheet: SheetConfig::default(),
            download_filename: default_download_filename(),
            print_title: default_print_title(),
        }
    }
}

impl StudioConfig {
    /// The working canvas as a size.
    pub fn canvas_size(&self) -> SizePx {
        SizePx::new(self.working_size, self.working_size)
    }

    /// Rule tables for the planner.
    pub fn plan_rules(&self) -> PlanRules<'_> {
        PlanRules {
            render_order: &self.render_order,
            tint_rules: &self.tint_rules,
            companion_rules: &self.companion_rules,
            include_guide: self.include_guide,
        }
    }

    /// Deserializes a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::TintTransform;
    use tempfile::tempdir;

    #[test]
    fn empty_object_is_default() {
        let config = StudioConfig::from_json("{}").unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.canvas_size(), SizePx::new(1024, 1024));
        assert_eq!(config.outline_px, 3);
        assert_eq!(config.render_order.first(), Some(&Category::Back));
        assert_eq!(config.render_order.last(), Some(&Category::Accessory));
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let json = r#"{
            "outlinePx": 5,
            "tintRules": [],
            "sheet": {"rows": 2}
        }"#;
        let config = StudioConfig::from_json(json).unwrap();

        assert_eq!(config.outline_px, 5);
        assert!(config.tint_rules.is_empty());
        assert_eq!(config.companion_rules, CompanionRule::defaults());
        assert_eq!(config.sheet.rows, 2);
        assert_eq!(config.sheet.columns, 3);
        assert_eq!(config.download_filename, "sticker-outline.png");
    }

    #[test]
    fn json_format_is_camel_case() {
        let json = StudioConfig::default().to_json_pretty().unwrap();
        assert!(json.contains("\"workingSize\""));
        assert!(json.contains("\"companionRules\""));
        assert!(json.contains("\"pageWidth\""));
        assert!(json.contains("\"peinado\""));
    }

    #[test]
    fn roundtrips_custom_rules() {
        let mut config = StudioConfig::default();
        config.tint_rules = vec![TintRule::new(
            Category::Eyebrows,
            Category::Hair,
            TintTransform::Darken(0.2),
        )];

        let restored = StudioConfig::from_json(&config.to_json_pretty().unwrap()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("studio.json");
        std::fs::write(&path, r#"{"workingSize": 256}"#).unwrap();

        assert_eq!(StudioConfig::load(&path).unwrap().working_size, 256);
        assert!(matches!(
            StudioConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn rejects_unknown_category() {
        let json = r#"{"renderOrder": ["base", "sombrero"]}"#;
        assert!(matches!(StudioConfig::from_json(json), Err(ConfigError::Json(_))));
    }
}
