//! Print sheet layout: a grid of identical stickers on one page.

use serde::{Deserialize, Serialize};

use crate::color::WHITE;
use crate::raster::{Raster, RectPx};

/// Page and grid parameters of the print sheet.
///
/// The defaults describe an A4 portrait page at 300 dpi holding four rows
/// of three stickers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct SheetConfig {
    pub rows: u32,
    pub columns: u32,
    pub page_width: u32,
    pub page_height: u32,
    /// Gap around the grid and between cells, in pixels.
    pub margin: u32,
    /// Factor applied to the cell size so rounding never overflows the page.
    pub shrink: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            columns: 3,
            page_width: 2480,
            page_height: 3508,
            margin: 36,
            shrink: 0.99,
        }
    }
}

/// Derived grid geometry of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub rows: u32,
    pub columns: u32,
    pub page_width: u32,
    pub page_height: u32,
    pub margin: u32,
    /// Space available per column before shrinking.
    pub cell_width: u32,
    /// Space available per row before shrinking.
    pub cell_height: u32,
    /// Side of the square cell every sticker is fitted into.
    pub cell_size: u32,
}

impl SheetLayout {
    pub fn compute(config: &SheetConfig) -> Self {
        let SheetConfig {
            rows,
            columns,
            page_width,
            page_height,
            margin,
            ..
        } = *config;

        let available = |page: u32, count: u32| -> u32 {
            if count == 0 {
                return 0;
            }
            let gaps = margin.saturating_mul(count.saturating_add(1));
            page.saturating_sub(gaps) / count
        };
        let cell_width = available(page_width, columns);
        let cell_height = available(page_height, rows);

        let shrink = config.shrink.clamp(0.0, 1.0) as f64;
        let cell_size = (cell_width.min(cell_height) as f64 * shrink).floor() as u32;

        Self {
            rows,
            columns,
            page_width,
            page_height,
            margin,
            cell_width,
            cell_height,
            cell_size,
        }
    }

    /// Number of cells on the page.
    pub fn cell_count(&self) -> u32 {
        self.rows * self.columns
    }

    /// The square cell at `row`, `column`.
    pub fn cell_rect(&self, row: u32, column: u32) -> RectPx {
        let stride = self.cell_size + self.margin;
        RectPx::new(
            self.margin + column * stride,
            self.margin + row * stride,
            self.cell_size,
            self.cell_size,
        )
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = RectPx> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |column| self.cell_rect(row, column)))
    }

    /// Where a `width` x `height` source lands inside `cell`: scaled to fit
    /// while keeping its aspect ratio, then centered.
    pub fn fit(&self, cell: RectPx, width: u32, height: u32) -> RectPx {
        let size = self.cell_size as f64;
        let scale = (size / width as f64).min(size / height as f64);
        let dw = (width as f64 * scale).round() as u32;
        let dh = (height as f64 * scale).round() as u32;
        RectPx::new(
            cell.x + ((size - dw as f64) / 2.0).round() as u32,
            cell.y + ((size - dh as f64) / 2.0).round() as u32,
            dw,
            dh,
        )
    }
}

/// Renders a white page with `source` repeated in every cell.
pub fn layout_sheet(source: &Raster, config: &SheetConfig) -> Raster {
    let layout = SheetLayout::compute(config);
    let mut page = Raster::filled(layout.page_width, layout.page_height, WHITE);

    if source.dimensions().is_empty() || layout.cell_size == 0 {
        return page;
    }

    for cell in layout.cells() {
        page.draw_scaled(source, layout.fit(cell, source.width(), source.height()));
    }

    log::debug!(
        "Laid out {} copies at {}px on a {}x{} page",
        layout.cell_count(),
        layout.cell_size,
        layout.page_width,
        layout.page_height
    );
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::SizePx;
    use palette::Srgb;

    #[test]
    fn default_a4_geometry() {
        let layout = SheetLayout::compute(&SheetConfig::default());

        assert_eq!(layout.cell_width, 778);
        assert_eq!(layout.cell_height, 832);
        assert_eq!(layout.cell_size, 770);
        assert!(layout.cell_size < layout.cell_width.min(layout.cell_height));
        assert_eq!(layout.cell_rect(0, 0), RectPx::new(36, 36, 770, 770));
        assert_eq!(layout.cell_rect(1, 2), RectPx::new(36 + 2 * 806, 36 + 806, 770, 770));
    }

    #[test]
    fn cells_fit_the_page_without_overlap() {
        let layout = SheetLayout::compute(&SheetConfig::default());
        let cells: Vec<_> = layout.cells().collect();
        assert_eq!(cells.len(), 12);

        for (i, a) in cells.iter().enumerate() {
            assert!(a.right() <= layout.page_width);
            assert!(a.bottom() <= layout.page_height);
            for b in &cells[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn shrink_is_clamped() {
        let config = SheetConfig {
            shrink: 3.0,
            ..SheetConfig::default()
        };
        assert_eq!(SheetLayout::compute(&config).cell_size, 778);
    }

    #[test]
    fn fit_keeps_aspect_and_centers() {
        let layout = SheetLayout::compute(&SheetConfig::default());
        let cell = layout.cell_rect(0, 0);

        // 2:1 source becomes 770x385, centered vertically
        let fitted = layout.fit(cell, 200, 100);
        assert_eq!(fitted, RectPx::new(36, 36 + 193, 770, 385));
    }

    #[test]
    fn sheet_repeats_source_in_every_cell() {
        let config = SheetConfig {
            rows: 2,
            columns: 2,
            page_width: 100,
            page_height: 100,
            margin: 10,
            shrink: 1.0,
        };
        let page = layout_sheet(&Raster::filled(7, 7, Srgb::new(0, 0, 0)), &config);
        let layout = SheetLayout::compute(&config);

        assert_eq!(page.dimensions(), SizePx::new(100, 100));
        for cell in layout.cells() {
            assert_eq!(page.data.get_pixel(cell.x + 1, cell.y + 1).0, [0, 0, 0, 255]);
        }
        // Margins stay white
        assert_eq!(page.data.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn zero_sized_source_leaves_page_white() {
        let page = layout_sheet(&Raster::new(0, 0), &SheetConfig::default());
        assert_eq!(page.dimensions(), SizePx::new(2480, 3508));
        assert!(page.data.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn empty_grid_gives_blank_page() {
        let config = SheetConfig {
            rows: 0,
            ..SheetConfig::default()
        };
        let page = layout_sheet(&Raster::filled(4, 4, Srgb::new(0, 0, 0)), &config);
        assert!(page.data.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn config_uses_camel_case_and_defaults() {
        let config: SheetConfig = serde_json::from_str(r#"{"rows": 2, "pageWidth": 1000}"#).unwrap();
        assert_eq!(config.rows, 2);
        assert_eq!(config.page_width, 1000);
        assert_eq!(config.columns, 3);
        assert_eq!(config.margin, 36);
    }
}
