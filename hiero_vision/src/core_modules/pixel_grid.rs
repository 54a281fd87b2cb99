// THEORY:
// The `PixelGrid` is the raw input of the segmentation engine: a rectangular,
// row-major grid of 8-bit intensities decoded from a grayscale scan. It is the
// one structure every later stage indexes into, so its shape invariant (every
// row has exactly `cols` cells, and there is at least one cell) is checked once
// at construction and never again.
//
// Key architectural principles:
// 1.  **Immutable Input**: Once built, a grid never changes. Per-scan working
//     state (foreground flags, visited flags) lives in a separate layer owned by
//     a single scan, see `pixel_state`.
// 2.  **Flat Storage**: Values are stored in one `Vec<u8>` indexed by
//     `row * cols + col`, the same layout as an `image::GrayImage` buffer, so
//     converting between the two is a copy, not a reshuffle.
// 3.  **Background Estimation**: The background intensity is the value of the
//     top-left pixel. This assumes a uniform background and a corner that is not
//     covered by a glyph; scans where that does not hold will misclassify.

use crate::core_modules::glyph_blob::Point;
use crate::error::{Result, SegmentationError};
use image::{GrayImage, Luma};

/// An immutable, non-empty grid of grayscale intensities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    rows: u32,
    cols: u32,
    values: Vec<u8>,
}

impl PixelGrid {
    /// Builds a grid from nested rows, rejecting empty or ragged input.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || cols == 0 {
            return Err(SegmentationError::EmptyGrid {
                rows: rows.len(),
                cols,
            });
        }

        let mut values = Vec::with_capacity(rows.len() * cols);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(SegmentationError::RaggedRow {
                    row: index,
                    expected: cols,
                    found: row.len(),
                });
            }
            values.extend_from_slice(row);
        }

        let (row_count, col_count) = grid_dimensions(rows.len(), cols)?;
        Ok(Self {
            rows: row_count,
            cols: col_count,
            values,
        })
    }

    /// Builds a grid from a flat row-major buffer.
    pub fn from_raw(cols: u32, rows: u32, values: Vec<u8>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(SegmentationError::EmptyGrid {
                rows: rows as usize,
                cols: cols as usize,
            });
        }
        let expected = rows as usize * cols as usize;
        if values.len() != expected {
            return Err(SegmentationError::BufferSizeMismatch {
                expected,
                found: values.len(),
            });
        }
        Ok(Self { rows, cols, values })
    }

    pub fn from_gray_image(image: &GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.as_raw().clone())
    }

    /// Copies the grid back into an image buffer, e.g. to annotate or re-scan it.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.cols, self.rows, |x, y| Luma([self.value(y, x)]))
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: an empty grid cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Flat index of a cell. Callers must stay within `rows x cols`.
    pub fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    pub fn value(&self, row: u32, col: u32) -> u8 {
        self.values[self.index(row, col)]
    }

    pub fn value_at(&self, point: Point) -> u8 {
        self.value(point.row, point.col)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.row < self.rows && point.col < self.cols
    }

    /// Estimates the background as the intensity of the top-left pixel.
    pub fn estimate_background(&self) -> u8 {
        self.values[0]
    }
}

// Images address pixels with u32, so larger grids are rejected instead of truncated.
fn grid_dimensions(rows: usize, cols: usize) -> Result<(u32, u32)> {
    match (u32::try_from(rows), u32::try_from(cols)) {
        (Ok(rows), Ok(cols)) => Ok((rows, cols)),
        _ => Err(SegmentationError::GridTooLarge { rows, cols }),
    }
}

/// Free-function form of [`PixelGrid::estimate_background`].
pub fn estimate_background(grid: &PixelGrid) -> u8 {
    grid.estimate_background()
}
