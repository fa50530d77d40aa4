//! Fetching layer art and drawing it into a single composite.
//!
//! Rendering runs in two phases. [`prepare`] resolves every reference of a
//! [`RenderPlan`] through an [`AssetSource`], decoding each reference at most
//! once per [`AssetCache`]. [`compose`] then draws the prepared layers in
//! order into a fresh buffer. Drawing never touches the source, so a failed
//! fetch can only drop a layer, never leave a half-drawn composite behind.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Category, RenderPlan, tint_layer};
use crate::color::Rgb;
use crate::raster::{Raster, SizePx};
use crate::source::{AssetSource, load_raster};

// ============================================================================
// Asset Cache
// ============================================================================

/// Decoded rasters keyed by reference, all at one working size.
///
/// Only successful loads are cached, so a reference that failed once is
/// retried on the next render.
#[derive(Debug, Clone)]
pub struct AssetCache {
    size: SizePx,
    rasters: HashMap<String, Arc<Raster>>,
}

impl AssetCache {
    pub fn new(size: SizePx) -> Self {
        Self {
            size,
            rasters: HashMap::new(),
        }
    }

    /// The working size every cached raster has.
    pub fn size(&self) -> SizePx {
        self.size
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }

    pub fn clear(&mut self) {
        self.rasters.clear();
    }

    /// Returns the raster behind `reference`, loading it on first use.
    ///
    /// A reference that cannot be loaded or decoded is logged and treated as
    /// absent.
    pub fn fetch(&mut self, source: &dyn AssetSource, reference: &str) -> Option<Arc<Raster>> {
        if let Some(raster) = self.rasters.get(reference) {
            return Some(Arc::clone(raster));
        }

        match load_raster(source, reference, self.size) {
            Ok(raster) => {
                let raster = Arc::new(raster);
                self.rasters.insert(reference.to_string(), Arc::clone(&raster));
                Some(raster)
            }
            Err(e) => {
                log::warn!("Skipping '{}' from {}: {}", reference, source.name(), e);
                None
            }
        }
    }
}

// ============================================================================
// Prepare
// ============================================================================

/// A planned layer with its art decoded.
#[derive(Debug, Clone)]
pub struct PreparedLayer {
    pub category: Category,
    pub fill: Option<Arc<Raster>>,
    pub outline: Option<Arc<Raster>>,
    pub tint: Option<Rgb>,
}

/// The output of the fetch phase.
#[derive(Debug, Clone, Default)]
pub struct PreparedFrame {
    pub guide: Option<Arc<Raster>>,
    pub layers: Vec<PreparedLayer>,
    /// References that could not be loaded.
    pub missing: Vec<String>,
}

impl PreparedFrame {
    /// Returns true if every reference of the plan was loaded.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Fetches every reference in `plan`.
///
/// Layers whose art failed to load entirely are dropped.
pub fn prepare(plan: &RenderPlan, source: &dyn AssetSource, cache: &mut AssetCache) -> PreparedFrame {
    let mut frame = PreparedFrame::default();
    let mut fetch = |reference: Option<&str>, missing: &mut Vec<String>| {
        let reference = reference?;
        let raster = cache.fetch(source, reference);
        if raster.is_none() {
            missing.push(reference.to_string());
        }
        raster
    };

    frame.guide = fetch(plan.guide.as_deref(), &mut frame.missing);

    for planned in &plan.layers {
        let fill = fetch(planned.asset.fill.as_deref(), &mut frame.missing);
        let outline = fetch(planned.asset.outline.as_deref(), &mut frame.missing);
        if fill.is_none() && outline.is_none() {
            continue;
        }
        frame.layers.push(PreparedLayer {
            category: planned.category,
            fill,
            outline,
            tint: planned.tint,
        });
    }

    frame
}

// ============================================================================
// Compose
// ============================================================================

/// Draws the guide and every layer, bottom to top, into a new buffer.
///
/// For each layer the fill is drawn first (recolored when the layer has a
/// tint) and the outline art is drawn untouched on top of it.
pub fn compose(size: SizePx, frame: &PreparedFrame) -> Raster {
    let mut target = Raster::new(size.width, size.height);
    compose_into(&mut target, frame);
    target
}

/// Clears `target` and draws the frame into it, reusing its allocation.
pub fn compose_into(target: &mut Raster, frame: &PreparedFrame) {
    target.clear();

    if let Some(guide) = &frame.guide {
        target.draw(guide, 0, 0);
    }

    for layer in &frame.layers {
        if let Some(fill) = &layer.fill {
            match layer.tint {
                Some(tint) => target.draw(&tint_layer(fill, tint), 0, 0),
                None => target.draw(fill, 0, 0),
            }
        }
        if let Some(outline) = &layer.outline {
            target.draw(outline, 0, 0);
        }
    }
}
