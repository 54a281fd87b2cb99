// THEORY:
// A `GlyphBlob` is one connected region of foreground pixels, presumed to be a
// single hieroglyph. It is created by the blob detector, its bounding box is
// computed once at creation, and nothing mutates it afterwards.
//
// The noise filter also lives here. Anything with `min_blob_size` pixels or
// fewer is treated as a scan artifact and dropped, preserving the order of what
// remains.

use serde::{Deserialize, Serialize};

/// Default noise threshold. Blobs need strictly more pixels than this to survive.
pub const DEFAULT_MIN_BLOB_SIZE: usize = 10;

/// A pixel coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: u32,
    pub col: u32,
}

impl Point {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// The minimal axis-aligned rectangle enclosing a set of points, inclusive on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl BoundingBox {
    /// Folds over `points`, seeding all four bounds from the first one.
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let seed = Self {
            min_row: first.row,
            max_row: first.row,
            min_col: first.col,
            max_col: first.col,
        };
        Some(points.iter().fold(seed, |bounds, point| Self {
            min_row: bounds.min_row.min(point.row),
            max_row: bounds.max_row.max(point.row),
            min_col: bounds.min_col.min(point.col),
            max_col: bounds.max_col.max(point.col),
        }))
    }

    /// Column extent, `max_col - min_col`. One less than the pixel width.
    pub fn col_extent(&self) -> u32 {
        self.max_col - self.min_col
    }

    /// Row extent, `max_row - min_row`. One less than the pixel height.
    pub fn row_extent(&self) -> u32 {
        self.max_row - self.min_row
    }
}

/// One connected component of foreground pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBlob {
    discovery_index: usize,
    pixels: Vec<Point>,
    bounding_box: BoundingBox,
}

impl GlyphBlob {
    /// Wraps a grown region. Returns `None` if `pixels` is empty.
    pub fn new(discovery_index: usize, pixels: Vec<Point>) -> Option<Self> {
        let bounding_box = BoundingBox::from_points(&pixels)?;
        Some(Self {
            discovery_index,
            pixels,
            bounding_box,
        })
    }

    /// Position of this blob in the raw raster-scan order, before noise filtering.
    pub fn discovery_index(&self) -> usize {
        self.discovery_index
    }

    /// Pixels in the order the region grower accepted them; the seed comes first.
    pub fn pixels(&self) -> &[Point] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false: an empty blob cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Recomputes the bounds from the pixel list. Matches `bounding_box()`.
    pub fn compute_bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.pixels).unwrap_or(self.bounding_box)
    }
}

/// Keeps only blobs with strictly more than `min_size` pixels, in their original order.
pub fn filter_blobs(blobs: Vec<GlyphBlob>, min_size: usize) -> Vec<GlyphBlob> {
    blobs
        .into_iter()
        .filter(|blob| blob.len() > min_size)
        .collect()
}
