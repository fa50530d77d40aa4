use crate::raster::{Raster, RectPx};

/// Smallest rectangle containing every pixel with non-zero alpha.
///
/// Returns `None` when the buffer has no such pixel.
pub fn opaque_bounds(raster: &Raster) -> Option<RectPx> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in raster.data.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    found.then(|| RectPx::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}
