// THEORY:
// The renderer is the thin boundary between segmentation results and images a
// person can look at. It never decides anything about glyphs; it only paints.
//
// 1.  **Crops**: each blob is copied onto a fresh single-channel canvas filled
//     with the background intensity, padded by a fixed margin on every side.
//     Only the blob's own pixels are painted, with their original intensity, so
//     a neighbouring glyph that happens to overlap the bounding box never leaks
//     into the crop.
// 2.  **Outlines**: a hollow rectangle `margin` pixels outside the bounding box
//     is drawn onto a caller-supplied canvas, in place. Callers that need the
//     untouched source must draw on a copy.

use crate::core_modules::glyph_blob::GlyphBlob;
use crate::core_modules::pixel_grid::PixelGrid;
use crate::error::{Result, SegmentationError};

pub mod renderer {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use imageproc::drawing::{Canvas, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    /// Padding around a cropped glyph and between a glyph and its outline.
    pub const CROP_MARGIN: u32 = 3;
    pub const OUTLINE_WIDTH: u32 = 2;
    pub const HIGHLIGHT: Rgb<u8> = Rgb([255, 0, 0]);

    /// Crops `blob` out of `grid` with the default 3 pixel margin.
    pub fn crop_blob_image(
        grid: &PixelGrid,
        blob: &GlyphBlob,
        background: u8,
    ) -> Result<GrayImage> {
        crop_with_margin(grid, blob, background, CROP_MARGIN)
    }

    /// Canvas is `(col_extent + 2 * margin, row_extent + 2 * margin)`. Fails with
    /// `InvalidConfig` when that size does not fit in `u32`.
    pub fn crop_with_margin(
        grid: &PixelGrid,
        blob: &GlyphBlob,
        background: u8,
        margin: u32,
    ) -> Result<GrayImage> {
        let bounds = blob.bounding_box();
        let padding = margin.checked_mul(2);
        let width = padding.and_then(|padding| bounds.col_extent().checked_add(padding));
        let height = padding.and_then(|padding| bounds.row_extent().checked_add(padding));
        let (Some(width), Some(height)) = (width, height) else {
            return Err(SegmentationError::invalid_config("margin", margin));
        };
        let mut crop = GrayImage::from_pixel(width, height, Luma([background]));

        for &point in blob.pixels() {
            let x = point.col - bounds.min_col + margin;
            let y = point.row - bounds.min_row + margin;
            crop.put_pixel(x, y, Luma([grid.value_at(point)]));
        }

        Ok(crop)
    }

    /// Outlines `blob` on an RGB image in the fixed highlight colour.
    pub fn draw_bounding_box(image: &mut RgbImage, blob: &GlyphBlob, margin: u32) {
        draw_outline(image, blob, margin, OUTLINE_WIDTH, HIGHLIGHT);
    }

    /// Draws `line_width` nested hollow rectangles, the outermost one running
    /// through `(min_col - margin, min_row - margin)` and
    /// `(max_col + margin, max_row + margin)`. Parts outside the canvas are clipped.
    pub fn draw_outline<C>(
        canvas: &mut C,
        blob: &GlyphBlob,
        margin: u32,
        line_width: u32,
        color: C::Pixel,
    ) where
        C: Canvas,
    {
        let bounds = blob.bounding_box();
        let margin = i64::from(margin);
        let line = i64::from(line_width);
        let (canvas_width, canvas_height) = canvas.dimensions();

        // Rings beyond these limits are entirely off-canvas either way; clamping
        // keeps every coordinate inside i32 for any margin.
        let left = (i64::from(bounds.min_col) - margin).max(-line);
        let top = (i64::from(bounds.min_row) - margin).max(-line);
        let right = (i64::from(bounds.max_col) + margin).min(i64::from(canvas_width) + line);
        let bottom = (i64::from(bounds.max_row) + margin).min(i64::from(canvas_height) + line);

        for inset in 0..line {
            let width = right - left + 1 - 2 * inset;
            let height = bottom - top + 1 - 2 * inset;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at((left + inset) as i32, (top + inset) as i32)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(canvas, rect, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::renderer::*;
    use super::*;
    use crate::core_modules::glyph_blob::Point;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn blob_from(points: &[(u32, u32)]) -> GlyphBlob {
        let pixels = points.iter().map(|&(r, c)| Point::new(r, c)).collect();
        GlyphBlob::new(0, pixels).expect("non-empty")
    }

    #[test]
    fn crop_is_padded_and_keeps_original_values() {
        let mut rows = vec![vec![100u8; 20]; 20];
        rows[5][6] = 250;
        rows[7][9] = 10;
        let grid = PixelGrid::from_rows(rows).expect("valid grid");
        let blob = blob_from(&[(5, 6), (7, 9)]);

        let crop = crop_blob_image(&grid, &blob, 100).expect("crop fits");

        assert_eq!(crop.dimensions(), (3 + 6, 2 + 6));
        assert_eq!(crop.get_pixel(3, 3), &Luma([250]));
        assert_eq!(crop.get_pixel(3 + 3, 3 + 2), &Luma([10]));
        assert_eq!(crop.get_pixel(0, 0), &Luma([100]));
        assert_eq!(crop.get_pixel(8, 7), &Luma([100]));
    }

    #[test]
    fn crop_leaves_out_foreign_pixels_inside_the_box() {
        let mut rows = vec![vec![100u8; 12]; 12];
        rows[4][4] = 255;
        rows[8][8] = 255;
        rows[6][6] = 0;
        let grid = PixelGrid::from_rows(rows).expect("valid grid");
        let blob = blob_from(&[(4, 4), (8, 8)]);

        let crop = crop_blob_image(&grid, &blob, 100).expect("crop fits");
        // (6, 6) is inside the bounding box but not part of the blob.
        assert_eq!(crop.get_pixel(6 - 4 + 3, 6 - 4 + 3), &Luma([100]));
    }

    #[test]
    fn outline_sits_outside_the_margin() {
        let mut image = RgbImage::from_pixel(30, 30, Rgb([0, 0, 0]));
        let blob = blob_from(&[(10, 10), (14, 16)]);

        draw_bounding_box(&mut image, &blob, CROP_MARGIN);

        // Outer ring corners and edges.
        assert_eq!(image.get_pixel(7, 7), &HIGHLIGHT);
        assert_eq!(image.get_pixel(19, 17), &HIGHLIGHT);
        assert_eq!(image.get_pixel(13, 7), &HIGHLIGHT);
        // Second, inner ring.
        assert_eq!(image.get_pixel(8, 8), &HIGHLIGHT);
        assert_eq!(image.get_pixel(18, 16), &HIGHLIGHT);
        // The glyph area and the third ring are untouched.
        assert_eq!(image.get_pixel(9, 9), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(12, 12), &Rgb([0, 0, 0]));
        // Outside the outline.
        assert_eq!(image.get_pixel(6, 6), &Rgb([0, 0, 0]));
    }

    #[test]
    fn outline_is_clipped_at_the_image_edge() {
        let mut image = GrayImage::from_pixel(10, 10, Luma([0]));
        let blob = blob_from(&[(1, 1), (2, 2)]);

        draw_outline(&mut image, &blob, CROP_MARGIN, 1, Luma([200]));

        // Left and top edges fall at -2 and are clipped; right and bottom land at 5.
        assert_eq!(image.get_pixel(5, 0), &Luma([200]));
        assert_eq!(image.get_pixel(0, 5), &Luma([200]));
        assert_eq!(image.get_pixel(2, 2), &Luma([0]));
    }

    #[test]
    fn crop_with_oversized_margin_is_an_error() {
        let grid = PixelGrid::from_rows(vec![vec![100u8; 8]; 8]).expect("valid grid");
        let blob = blob_from(&[(2, 2), (4, 5)]);

        for margin in [u32::MAX / 2 + 1, u32::MAX - 1, u32::MAX] {
            assert!(matches!(
                crop_with_margin(&grid, &blob, 100, margin),
                Err(SegmentationError::InvalidConfig { .. })
            ));
        }
        let crop = crop_with_margin(&grid, &blob, 100, 20).expect("crop fits");
        assert_eq!(crop.dimensions(), (3 + 40, 2 + 40));
    }

    #[test]
    fn outline_with_huge_margin_stays_off_canvas() {
        let mut image = GrayImage::from_pixel(10, 10, Luma([0]));
        let blob = blob_from(&[(4, 4), (5, 5)]);

        draw_outline(&mut image, &blob, u32::MAX, 2, Luma([200]));

        assert!(image.pixels().all(|pixel| *pixel == Luma([0])));
    }
}
