use crate::color::Rgb;
use crate::raster::Raster;

/// Builds a ring of `color` around the silhouette of `source`.
///
/// The silhouette is stamped at the eight compass offsets at distance
/// `stroke_px`, and after every stamp the accumulated shape is repainted in
/// `color`. The output has the same size as `source`, a transparent
/// background, and still covers the silhouette's interior; drawing `source`
/// on top of it leaves only the ring visible.
///
/// A stroke of 0 produces a fully transparent buffer.
pub fn outline(source: &Raster, stroke_px: u32, color: Rgb) -> Raster {
    let mut out = Raster::new(source.width(), source.height());
    if stroke_px == 0 {
        return out;
    }

    // Any offset past the larger side moves the mask fully off the canvas.
    let reach = source.width().max(source.height()).max(1);
    let w = stroke_px.min(reach).min(i32::MAX as u32) as i32;
    let offsets = [
        (-w, 0),
        (w, 0),
        (0, -w),
        (0, w),
        (-w, -w),
        (w, -w),
        (-w, w),
        (w, w),
    ];

    for (dx, dy) in offsets {
        out.draw(source, dx, dy);
        out.fill_atop(color);
    }

    out
}
