//! Raster buffers and the compositing primitives the pipeline is built from.
//!
//! Every stage of the sticker pipeline passes [`Raster`]s around: a fixed-size
//! RGBA grid with straight (non-premultiplied) alpha. The operations here are
//! the only ways pixels get combined, so their blending rules define the look
//! of the final sticker.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::color::Rgb;
use crate::error::RenderError;

/// A rectangle defined in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectPx {
    /// X offset from the left edge of the image
    pub x: u32,
    /// Y offset from the top edge of the image
    pub y: u32,
    /// Width of the rectangle
    pub width: u32,
    /// Height of the rectangle
    pub height: u32,
}

impl RectPx {
    /// Creates a new rectangle with the given position and dimensions.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle starting at origin (0, 0) with the given dimensions.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Returns true if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &RectPx) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ============================================================================
// Raster
// ============================================================================

/// A fixed-size RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// The pixel data, straight alpha.
    pub data: RgbaImage,
}

impl Raster {
    /// Creates a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: RgbaImage::new(width, height),
        }
    }

    /// Creates a buffer filled with an opaque color.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            data: RgbaImage::from_pixel(width, height, opaque(color)),
        }
    }

    /// Wraps existing image data.
    pub fn from_image(data: RgbaImage) -> Self {
        Self { data }
    }

    /// Decodes PNG (or any format `image` recognizes) into a buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        Ok(Self::from_image(image::load_from_memory(bytes)?.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// Returns the pixel dimensions of the buffer.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    /// Alpha channel at `(x, y)`, or 0 outside the buffer.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.data.get_pixel_checked(x, y).map_or(0, |p| p[3])
    }

    /// Returns true if no pixel has non-zero alpha.
    pub fn is_blank(&self) -> bool {
        self.data.pixels().all(|p| p[3] == 0)
    }

    /// Resets every pixel to transparent.
    pub fn clear(&mut self) {
        for pixel in self.data.pixels_mut() {
            pixel.0 = [0, 0, 0, 0];
        }
    }

    /// Draws `src` with its top-left corner at `(x, y)` using source-over.
    ///
    /// Pixels falling outside this buffer are clipped.
    pub fn draw(&mut self, src: &Raster, x: i32, y: i32) {
        composite_over(&mut self.data, &src.data, x, y);
    }

    /// Draws `src` scaled to exactly fill `dest`, using source-over.
    ///
    /// Does nothing when either the source or the destination is empty.
    pub fn draw_scaled(&mut self, src: &Raster, dest: RectPx) {
        if src.dimensions().is_empty() || dest.width == 0 || dest.height == 0 {
            return;
        }
        let x = i32::try_from(dest.x).unwrap_or(i32::MAX);
        let y = i32::try_from(dest.y).unwrap_or(i32::MAX);
        let scaled = src.resized(SizePx::new(dest.width, dest.height));
        composite_over(&mut self.data, &scaled.data, x, y);
    }

    /// Returns a copy resampled to `size`, or a plain clone if it already matches.
    pub fn resized(&self, size: SizePx) -> Raster {
        if self.dimensions() == size {
            return self.clone();
        }
        Raster::from_image(image::imageops::resize(
            &self.data,
            size.width,
            size.height,
            FilterType::Triangle,
        ))
    }

    /// Flat-fills with an opaque color, restricted to the existing silhouette.
    ///
    /// This is the canvas `source-atop` rule with an opaque source: every
    /// pixel keeps its alpha and takes `color`. Transparent pixels stay
    /// transparent, so the fill can never grow the silhouette.
    pub fn fill_atop(&mut self, color: Rgb) {
        for pixel in self.data.pixels_mut() {
            let alpha = pixel[3];
            pixel.0 = if alpha == 0 {
                [0, 0, 0, 0]
            } else {
                [color.red, color.green, color.blue, alpha]
            };
        }
    }

    /// Copies the region `rect` into a new buffer of the same size as `rect`.
    pub fn crop(&self, rect: RectPx) -> Raster {
        Raster::from_image(
            image::imageops::crop_imm(&self.data, rect.x, rect.y, rect.width, rect.height).to_image(),
        )
    }

    /// Encodes the buffer as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Cursor::new(Vec::new());
        self.data.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }
}

fn opaque(color: Rgb) -> Rgba<u8> {
    Rgba([color.red, color.green, color.blue, 255])
}

// ============================================================================
// Compositing
// ============================================================================

/// Composites a source image onto a destination image at the specified position.
///
/// Uses standard alpha blending (source over destination).
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let dest_width = dest.width() as i32;
    let dest_height = dest.height() as i32;

    for (sx, sy, src_pixel) in src.enumerate_pixels() {
        if src_pixel[3] == 0 {
            continue;
        }

        let dx = x.saturating_add(sx as i32);
        let dy = y.saturating_add(sy as i32);
        if dx < 0 || dy < 0 || dx >= dest_width || dy >= dest_height {
            continue;
        }

        let dst_pixel = dest.get_pixel_mut(dx as u32, dy as u32);
        *dst_pixel = alpha_blend(*src_pixel, *dst_pixel);
    }
}

/// Alpha blends two RGBA pixels (source over destination).
fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 || dst[3] == 0 {
        return src;
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round() as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}
