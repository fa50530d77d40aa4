//! sticker-renderer: layered character compositing and sticker export
//!
//! This crate composes a character from layered raster art (back, base,
//! eyes, hair, ...), tints layers on request, and turns the result into a
//! die-cut style sticker with a white and a black outline ring. The sticker
//! can be exported as a transparent PNG or repeated across an A4 print sheet.
//!
//! # Example
//!
//! ```
//! use sticker_renderer::{
//!     Catalog, Category, InMemoryAssetSource, LayerAsset, Raster, StickerStudio, StudioConfig,
//! };
//! use palette::Srgb;
//!
//! // One base layer: an opaque 8x8 square in the middle of a 32x32 canvas
//! let mut art = Raster::new(32, 32);
//! art.draw(&Raster::filled(8, 8, Srgb::new(255, 255, 255)), 12, 12);
//!
//! let mut source = InMemoryAssetSource::new();
//! source.insert_raster("base/base-fondo-01.png", &art).unwrap();
//!
//! let catalog = Catalog::new().with(
//!     Category::Base,
//!     LayerAsset::new("01", "base/base-01.png").with_fill("base/base-fondo-01.png"),
//! );
//! let config = StudioConfig {
//!     working_size: 32,
//!     outline_px: 2,
//!     ..StudioConfig::default()
//! };
//!
//! let mut studio = StickerStudio::new(catalog, config);
//! studio.set_tint_hex(Category::Base, "#f2c9a0");
//!
//! let artifacts = studio.preview(&source).unwrap();
//! // Two 2px rings on every side of the square
//! assert_eq!(artifacts.transparent.width(), 8 + 4 * 2);
//! ```
//!
//! # Pipeline
//!
//! 1. [`Catalog`] lists the art available per [`Category`]
//! 2. [`StickerStudio`] holds the selections and resolves a [`RenderPlan`]
//! 3. An [`AssetSource`] supplies the art, which [`compose`] stacks
//! 4. [`finalize`] adds the outline rings and crops the variants
//! 5. [`layout_sheet`] builds the print page, and an [`ExportHost`] receives
//!    the results
//!
//! The library logs through the `log` facade and never installs a logger.

mod catalog;
mod color;
mod config;
mod error;
mod export;
mod layer;
mod raster;
mod source;
mod sticker;
mod studio;

pub use catalog::{Catalog, LayerAsset};
pub use color::{BLACK, Rgb, WHITE, darken, darken_rgb, hex_to_rgb, rgb_to_hex};
pub use config::{DEFAULT_OUTLINE_PX, DEFAULT_WORKING_SIZE, StudioConfig};
pub use error::{CatalogError, ConfigError, ExportError, HostError, LoadError, RenderError};
pub use export::{DirectoryHost, ExportHost};
pub use layer::{
    AssetCache, Category, CompanionRule, LayerSlot, LayerStack, PlanRules, PlannedLayer,
    PreparedFrame, PreparedLayer, RenderPlan, TintRule, TintTransform, compose, compose_into,
    effective_tints, prepare, tint_layer,
};
pub use raster::{Raster, RectPx, SizePx, composite_over};
pub use source::{AssetBytes, AssetSource, FilesystemAssetSource, InMemoryAssetSource, load_raster};
pub use sticker::{
    SheetConfig, SheetLayout, StickerVariants, combine, finalize, layout_sheet, opaque_bounds,
    outline, tight_crop,
};
pub use studio::{ActionPanel, PanelStatus, StickerArtifacts, StickerStudio};
