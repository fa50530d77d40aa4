//! The sticker studio session.
//!
//! [`StickerStudio`] owns a user's selections and drives the whole pipeline:
//! plan, fetch, compose, finalize and export. Every pipeline run takes
//! `&mut self`, so two runs can never interleave on one session, and each
//! run draws into fresh buffers that replace the presented artifacts only
//! once the run has finished.

use std::sync::Arc;

use crate::catalog::{Catalog, LayerAsset};
use crate::color::{Rgb, hex_to_rgb};
use crate::config::StudioConfig;
use crate::error::{ExportError, RenderError};
use crate::export::ExportHost;
use crate::layer::{AssetCache, Category, LayerStack, RenderPlan, compose, effective_tints, prepare};
use crate::raster::Raster;
use crate::source::AssetSource;
use crate::sticker::{finalize, layout_sheet};

// ============================================================================
// Artifacts
// ============================================================================

/// Output of one full pipeline run.
#[derive(Debug, Clone)]
pub struct StickerArtifacts {
    /// The composed character at working size.
    pub composite: Arc<Raster>,
    /// The composite wrapped in both outline rings, at working size.
    pub outlined: Raster,
    /// Tightly cropped sticker with a transparent background.
    pub transparent: Raster,
    /// Tightly cropped sticker flattened onto white, used for print sheets.
    pub print: Raster,
}

/// Whether the last refresh produced new artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelStatus {
    /// The pipeline succeeded and the artifacts are current.
    Ready,
    /// The pipeline failed. Previous artifacts, if any, are still exportable.
    Degraded { reason: String },
}

/// State of the export controls after a refresh.
///
/// The controls are always shown and enabled after a refresh, even when the
/// pipeline failed, so the user is never left without a way forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPanel {
    pub status: PanelStatus,
    pub visible: bool,
    pub download_enabled: bool,
    pub print_enabled: bool,
}

impl ActionPanel {
    fn new(status: PanelStatus) -> Self {
        Self {
            status,
            visible: true,
            download_enabled: true,
            print_enabled: true,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, PanelStatus::Degraded { .. })
    }
}

#[derive(Debug, Clone)]
struct CachedComposite {
    version: u64,
    raster: Arc<Raster>,
}

// ============================================================================
// StickerStudio
// ============================================================================

/// A customization session over one catalog.
///
/// # Example
///
/// ```
/// use sticker_renderer::{Catalog, Category, InMemoryAssetSource, LayerAsset, StickerStudio, StudioConfig};
///
/// let catalog = Catalog::new().with(Category::Base, LayerAsset::new("01", "base-01.png"));
/// let mut studio = StickerStudio::new(catalog, StudioConfig::default());
///
/// studio.set_tint_hex(Category::Base, "#f2c9a0");
/// assert_eq!(studio.plan().layers.len(), 1);
///
/// // Missing art is skipped, so an empty source still renders.
/// let panel = studio.refresh(&InMemoryAssetSource::new());
/// assert!(!panel.is_degraded());
/// ```
#[derive(Debug)]
pub struct StickerStudio {
    catalog: Catalog,
    config: StudioConfig,
    stack: LayerStack,
    assets: AssetCache,
    composite: Option<CachedComposite>,
    artifacts: Option<StickerArtifacts>,
}

impl StickerStudio {
    /// Starts a session with the first asset of every category selected.
    pub fn new(catalog: Catalog, config: StudioConfig) -> Self {
        let stack = LayerStack::with_defaults(&catalog);
        let assets = AssetCache::new(config.canvas_size());
        Self {
            catalog,
            config,
            stack,
            assets,
            composite: None,
            artifacts: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// The asset selected for a category.
    pub fn selection(&self, category: Category) -> Option<&LayerAsset> {
        self.stack.slot(category)?.asset()
    }

    /// Selects the asset with `id` in `category`.
    ///
    /// Returns false, leaving the selection unchanged, if the catalog has no
    /// such asset.
    pub fn select(&mut self, category: Category, id: &str) -> bool {
        let Some(asset) = self.catalog.find(category, id).cloned() else {
            log::warn!("No '{}' asset with id '{}'", category, id);
            return false;
        };
        self.stack.slot_mut(category).set_asset(Some(asset));
        true
    }

    /// Deselects a category so it is not drawn.
    pub fn clear_selection(&mut self, category: Category) {
        self.stack.slot_mut(category).set_asset(None);
    }

    /// Sets or clears the explicit tint of a category.
    pub fn set_tint(&mut self, category: Category, tint: Option<Rgb>) {
        self.stack.slot_mut(category).set_tint(tint);
    }

    /// Sets the explicit tint of a category from a hex string.
    pub fn set_tint_hex(&mut self, category: Category, hex: &str) {
        self.set_tint(category, Some(hex_to_rgb(hex)));
    }

    /// The tint a category is drawn with, explicit or derived.
    pub fn effective_tint(&self, category: Category) -> Option<Rgb> {
        effective_tints(&self.stack.explicit_tints(), &self.config.tint_rules)
            .get(&category)
            .copied()
    }

    /// Back to the initial state: first assets selected, no tints.
    pub fn reset(&mut self) {
        self.stack.select_defaults(&self.catalog);
    }

    /// The layers the next render would draw.
    pub fn plan(&self) -> RenderPlan {
        self.stack.plan(&self.catalog, self.config.plan_rules())
    }

    /// Artifacts of the last successful pipeline run.
    pub fn artifacts(&self) -> Option<&StickerArtifacts> {
        self.artifacts.as_ref()
    }

    /// Composes the current selection.
    ///
    /// The result is reused until a selection or tint changes. A composite
    /// with missing art is returned but not reused, so the art is requested
    /// again next time.
    ///
    /// Decoded art and the composite are cached by reference, not by
    /// source, so a session expects the same source on every call. Call
    /// [`clear_cache`](Self::clear_cache) before switching to another one.
    pub fn render(&mut self, source: &dyn AssetSource) -> Result<Arc<Raster>, RenderError> {
        let size = self.config.canvas_size();
        if size.is_empty() {
            return Err(RenderError::InvalidWorkingSize {
                width: size.width,
                height: size.height,
            });
        }

        let version = self.stack.version();
        if let Some(cached) = &self.composite {
            if cached.version == version {
                return Ok(Arc::clone(&cached.raster));
            }
        }

        let plan = self.plan();
        let frame = prepare(&plan, source, &mut self.assets);
        let raster = Arc::new(compose(size, &frame));

        if frame.is_complete() {
            self.composite = Some(CachedComposite {
                version,
                raster: Arc::clone(&raster),
            });
        } else {
            log::warn!("{} asset(s) missing, composite not cached", frame.missing.len());
            self.composite = None;
        }

        Ok(raster)
    }

    /// Drops the decoded art and the cached composite. Stored artifacts are
    /// kept.
    pub fn clear_cache(&mut self) {
        self.assets.clear();
        self.composite = None;
    }

    /// Runs the full pipeline and stores the resulting artifacts.
    pub fn preview(&mut self, source: &dyn AssetSource) -> Result<&StickerArtifacts, RenderError> {
        let composite = self.render(source)?;
        let variants = finalize(&composite, self.config.outline_px);

        let artifacts = self.artifacts.insert(StickerArtifacts {
            composite,
            outlined: variants.outlined,
            transparent: variants.transparent,
            print: variants.print,
        });
        Ok(&*artifacts)
    }

    /// Runs the pipeline and reports the state of the export controls.
    ///
    /// Failures are logged rather than returned: the panel comes back
    /// degraded and the previous artifacts stay in place.
    pub fn refresh(&mut self, source: &dyn AssetSource) -> ActionPanel {
        match self.preview(source) {
            Ok(_) => ActionPanel::new(PanelStatus::Ready),
            Err(e) => {
                log::error!("Sticker pipeline failed: {}", e);
                ActionPanel::new(PanelStatus::Degraded {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Saves the transparent sticker as a PNG under the configured name.
    pub fn download_sticker(&self, host: &mut dyn ExportHost) -> Result<(), ExportError> {
        let artifacts = self.artifacts.as_ref().ok_or(ExportError::NothingToExport)?;
        let png = artifacts.transparent.encode_png()?;
        let filename = &self.config.download_filename;

        host.save_file(filename, &png).map_err(|source| {
            log::warn!("Download of '{}' refused: {}", filename, source);
            ExportError::HostRefused {
                what: filename.clone(),
                source,
            }
        })
    }

    /// Lays the print sticker out on a sheet and opens a print surface.
    pub fn print_sheet(&self, host: &mut dyn ExportHost) -> Result<(), ExportError> {
        let artifacts = self.artifacts.as_ref().ok_or(ExportError::NothingToExport)?;
        let sheet = layout_sheet(&artifacts.print, &self.config.sheet);
        let png = sheet.encode_png()?;

        host.open_print_surface(&self.config.print_title, &png)
            .map_err(|source| {
                log::warn!("Print surface refused: {}", source);
                ExportError::HostRefused {
                    what: "print sheet".to_string(),
                    source,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::raster::SizePx;
    use crate::source::InMemoryAssetSource;
    use crate::sticker::SheetConfig;
    use image::{Rgba, RgbaImage};
    use palette::Srgb;

    const SIZE: u32 = 16;

    fn block(x: u32, y: u32, side: u32, color: [u8; 4]) -> Raster {
        let mut img = RgbaImage::new(SIZE, SIZE);
        for py in y..y + side {
            for px in x..x + side {
                img.put_pixel(px, py, Rgba(color));
            }
        }
        Raster::from_image(img)
    }

    fn catalog() -> Catalog {
        Catalog::new()
            .with(
                Category::Base,
                LayerAsset::new("01", "base-01.png").with_fill("base-fondo-01.png"),
            )
            .with(Category::Base, LayerAsset::new("02", "base-02.png"))
            .with(Category::Hair, LayerAsset::new("01", "peinado-01.png"))
            .with(Category::Back, LayerAsset::new("01", "espalda-01.png"))
    }

    fn source() -> InMemoryAssetSource {
        let mut source = InMemoryAssetSource::new();
        source
            .insert_raster("base-fondo-01.png", &block(6, 6, 4, [255, 255, 255, 255]))
            .unwrap();
        source
            .insert_raster("base-01.png", &block(6, 6, 1, [0, 0, 0, 255]))
            .unwrap();
        source
            .insert_raster("base-02.png", &block(4, 4, 2, [0, 0, 0, 255]))
            .unwrap();
        source
            .insert_raster("peinado-01.png", &block(6, 5, 1, [90, 40, 10, 255]))
            .unwrap();
        source
            .insert_raster("espalda-01.png", &block(9, 9, 1, [255, 255, 255, 255]))
            .unwrap();
        source
    }

    fn config() -> StudioConfig {
        StudioConfig {
            working_size: SIZE,
            outline_px: 1,
            sheet: SheetConfig {
                rows: 2,
                columns: 2,
                page_width: 64,
                page_height: 64,
                margin: 4,
                shrink: 1.0,
            },
            ..StudioConfig::default()
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        saved: Vec<(String, Vec<u8>)>,
        printed: Vec<(String, Vec<u8>)>,
    }

    impl ExportHost for RecordingHost {
        fn save_file(&mut self, filename: &str, bytes: &[u8]) -> Result<(), HostError> {
            self.saved.push((filename.to_string(), bytes.to_vec()));
            Ok(())
        }

        fn open_print_surface(&mut self, title: &str, png: &[u8]) -> Result<(), HostError> {
            self.printed.push((title.to_string(), png.to_vec()));
            Ok(())
        }
    }

    struct BlockedHost;

    impl ExportHost for BlockedHost {
        fn save_file(&mut self, _: &str, _: &[u8]) -> Result<(), HostError> {
            Err(HostError::Refused("downloads disabled".into()))
        }

        fn open_print_surface(&mut self, _: &str, _: &[u8]) -> Result<(), HostError> {
            Err(HostError::Refused("popup blocked".into()))
        }
    }

    #[test]
    fn starts_with_first_assets_and_no_tints() {
        let studio = StickerStudio::new(catalog(), config());

        assert_eq!(studio.selection(Category::Base).unwrap().id, "01");
        assert_eq!(studio.selection(Category::Hair).unwrap().id, "01");
        assert!(studio.selection(Category::Eyes).is_none());
        assert!(studio.effective_tint(Category::Base).is_none());
    }

    #[test]
    fn select_unknown_id_keeps_selection() {
        let mut studio = StickerStudio::new(catalog(), config());

        assert!(!studio.select(Category::Base, "99"));
        assert_eq!(studio.selection(Category::Base).unwrap().id, "01");

        assert!(studio.select(Category::Base, "02"));
        assert_eq!(studio.selection(Category::Base).unwrap().id, "02");
    }

    #[test]
    fn derived_tints_follow_sources() {
        let mut studio = StickerStudio::new(catalog(), config());
        studio.set_tint_hex(Category::Base, "#c86432");
        studio.set_tint_hex(Category::Hair, "#ffffff");

        assert_eq!(studio.effective_tint(Category::Nose), Some(Srgb::new(200, 100, 50)));
        assert_eq!(studio.effective_tint(Category::Ears), Some(Srgb::new(200, 100, 50)));
        // 200 * 0.94 = 188, 100 * 0.94 = 94, 50 * 0.94 = 47
        assert_eq!(studio.effective_tint(Category::Mouth), Some(Srgb::new(188, 94, 47)));
        // 255 * 0.93 = 237.15
        assert_eq!(studio.effective_tint(Category::Back), Some(Srgb::new(237, 237, 237)));

        studio.set_tint_hex(Category::Nose, "#000000");
        assert_eq!(studio.effective_tint(Category::Nose), Some(Srgb::new(0, 0, 0)));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut studio = StickerStudio::new(catalog(), config());
        studio.select(Category::Base, "02");
        studio.clear_selection(Category::Hair);
        studio.set_tint_hex(Category::Base, "#123456");

        studio.reset();

        assert_eq!(studio.selection(Category::Base).unwrap().id, "01");
        assert_eq!(studio.selection(Category::Hair).unwrap().id, "01");
        assert!(studio.effective_tint(Category::Base).is_none());
    }

    #[test]
    fn plan_includes_companion_back() {
        let studio = StickerStudio::new(catalog(), config());
        let categories: Vec<_> = studio.plan().layers.iter().map(|l| l.category).collect();
        assert_eq!(categories, vec![Category::Back, Category::Base, Category::Hair]);
    }

    #[test]
    fn render_is_cached_until_selection_changes() {
        let mut studio = StickerStudio::new(catalog(), config());
        let source = source();

        let first = studio.render(&source).unwrap();
        let second = studio.render(&source).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        studio.set_tint_hex(Category::Base, "#ff0000");
        let third = studio.render(&source).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.data.get_pixel(8, 8).0, [255, 0, 0, 255]);
    }

    #[test]
    fn clear_cache_picks_up_new_source() {
        let mut studio = StickerStudio::new(catalog(), config());
        studio.clear_selection(Category::Hair);
        let white = source();
        let mut blue = source();
        blue
            .insert_raster("base-fondo-01.png", &block(6, 6, 4, [0, 0, 255, 255]))
            .unwrap();

        let first = studio.render(&white).unwrap();
        assert_eq!(first.data.get_pixel(8, 8).0, [255, 255, 255, 255]);

        studio.clear_cache();
        let second = studio.render(&blue).unwrap();
        assert_eq!(second.data.get_pixel(8, 8).0, [0, 0, 255, 255]);
    }

    #[test]
    fn incomplete_render_is_not_cached() {
        let mut studio = StickerStudio::new(catalog(), config());
        let empty = InMemoryAssetSource::new();

        let first = studio.render(&empty).unwrap();
        assert!(first.is_blank());

        let second = studio.render(&source()).unwrap();
        assert!(!second.is_blank());
    }

    #[test]
    fn preview_produces_outlined_variants() {
        let mut studio = StickerStudio::new(catalog(), config());
        studio.clear_selection(Category::Hair);

        let artifacts = studio.preview(&source()).unwrap();

        // 4x4 base fill, one white and one black ring of 1px each
        assert_eq!(artifacts.transparent.dimensions(), SizePx::new(8, 8));
        assert_eq!(artifacts.transparent.data.get_pixel(0, 0).0[3], 255);
        assert_eq!(artifacts.print.dimensions(), SizePx::new(8, 8));
        assert_eq!(artifacts.outlined.dimensions(), SizePx::new(SIZE, SIZE));
    }

    #[test]
    fn invalid_working_size_degrades_panel() {
        let config = StudioConfig {
            working_size: 0,
            ..config()
        };
        let mut studio = StickerStudio::new(catalog(), config);

        let panel = studio.refresh(&source());

        assert!(panel.is_degraded());
        assert!(panel.visible && panel.download_enabled && panel.print_enabled);
        assert!(studio.artifacts().is_none());
    }

    #[test]
    fn exports_need_artifacts() {
        let studio = StickerStudio::new(catalog(), config());
        let mut host = RecordingHost::default();

        assert!(matches!(
            studio.download_sticker(&mut host),
            Err(ExportError::NothingToExport)
        ));
        assert!(matches!(studio.print_sheet(&mut host), Err(ExportError::NothingToExport)));
    }

    #[test]
    fn download_and_print_reach_host() {
        let mut studio = StickerStudio::new(catalog(), config());
        assert!(!studio.refresh(&source()).is_degraded());
        let mut host = RecordingHost::default();

        studio.download_sticker(&mut host).unwrap();
        studio.print_sheet(&mut host).unwrap();

        let (name, png) = &host.saved[0];
        assert_eq!(name, "sticker-outline.png");
        let sticker = Raster::decode(png).unwrap();
        assert_eq!(sticker, studio.artifacts().unwrap().transparent);

        let (title, png) = &host.printed[0];
        assert_eq!(title, &studio.config().print_title);
        assert_eq!(Raster::decode(png).unwrap().dimensions(), SizePx::new(64, 64));
    }

    #[test]
    fn host_refusal_is_reported() {
        let mut studio = StickerStudio::new(catalog(), config());
        studio.refresh(&source());

        let err = studio.print_sheet(&mut BlockedHost).unwrap_err();
        assert!(matches!(err, ExportError::HostRefused { .. }));
        assert!(err.to_string().contains("popup blocked"));

        // Session state is untouched
        assert!(studio.artifacts().is_some());
        assert!(matches!(
            studio.download_sticker(&mut BlockedHost),
            Err(ExportError::HostRefused { .. })
        ));
    }
}
