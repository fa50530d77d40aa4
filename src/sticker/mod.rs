//! Turning a composite into a finished sticker.
//!
//! The finalizer wraps the composite in two outline rings, white inside
//! black, and then produces two tightly cropped variants:
//!
//! - the transparent variant keeps the background alpha (the downloadable
//!   sticker)
//! - the print variant is flattened onto opaque white (the art placed on the
//!   print sheet)

pub mod bounds;
pub mod outline;
pub mod sheet;

pub use bounds::opaque_bounds;
pub use outline::outline;
pub use sheet::{SheetConfig, SheetLayout, layout_sheet};

use crate::color::{BLACK, Rgb, WHITE};
use crate::raster::Raster;

/// Everything the finalizer produces from one composite.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerVariants {
    /// Full-size art with both outline rings.
    pub outlined: Raster,
    /// `outlined` cropped to its content, background transparent.
    pub transparent: Raster,
    /// `outlined` cropped to its content over opaque white.
    pub print: Raster,
}

/// Draws `outline` and then `base` into a new buffer.
///
/// The result is as large as the larger of the two inputs in each
/// dimension.
pub fn combine(base: &Raster, outline: &Raster) -> Raster {
    let width = base.width().max(outline.width());
    let height = base.height().max(outline.height());

    let mut out = Raster::new(width, height);
    out.draw(outline, 0, 0);
    out.draw(base, 0, 0);
    out
}

/// Crops `raster` to its opaque bounds, optionally over a solid background.
///
/// A buffer without content is returned at full size instead.
pub fn tight_crop(raster: &Raster, background: Option<Rgb>) -> Raster {
    let content = match opaque_bounds(raster) {
        Some(rect) => raster.crop(rect),
        None => raster.clone(),
    };

    match background {
        Some(color) => {
            let mut flat = Raster::filled(content.width(), content.height(), color);
            flat.draw(&content, 0, 0);
            flat
        }
        None => content,
    }
}

/// Wraps `composite` in a white ring and a black ring of `stroke_px` each and
/// produces the cropped variants.
pub fn finalize(composite: &Raster, stroke_px: u32) -> StickerVariants {
    let white_ring = outline(composite, stroke_px, WHITE);
    let white_outlined = combine(composite, &white_ring);

    let black_ring = outline(&white_outlined, stroke_px, BLACK);
    let outlined = combine(&white_outlined, &black_ring);

    if opaque_bounds(&outlined).is_none() {
        log::debug!("Sticker has no visible content, exporting the full canvas");
    }

    StickerVariants {
        transparent: tight_crop(&outlined, None),
        print: tight_crop(&outlined, Some(WHITE)),
        outlined,
    }
}
