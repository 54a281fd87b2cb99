// THEORY:
// The `pipeline` module is the top-level API for the segmentation engine. It
// runs the full stack over one grid as a single linear pass and hands back a
// `Segmentation` that the caller's storage and rendering code can consume.
//
// Stages, in order:
// 1.  Background estimation (top-left pixel).
// 2.  Foreground classification against the configured tolerance.
// 3.  Raster scan with windowed region growing.
// 4.  Noise filtering by minimum blob size.
// 5.  Bounding boxes (computed as each blob is created).
//
// Everything is in memory. File names are suggested, never written; the
// engine has no idea where anything is stored.

use crate::core_modules::blob_detector::blob_detector;
use crate::core_modules::glyph_blob::{DEFAULT_MIN_BLOB_SIZE, GlyphBlob, filter_blobs};
use crate::core_modules::pixel_grid::PixelGrid;
use crate::core_modules::pixel_state::DEFAULT_TOLERANCE;
use crate::core_modules::renderer::renderer;
use crate::error::{Result, SegmentationError};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

// Re-export key data structures for the public API.
pub use crate::core_modules::glyph_blob::{BoundingBox, Point};

/// Largest accepted `margin`. Crops and outlines are padded by it on every side.
pub const MAX_MARGIN: u32 = 1024;

/// Configuration for the SegmentationPipeline, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum absolute intensity difference from the background for a pixel to count as ink.
    pub tolerance: u8,
    /// Blobs with this many pixels or fewer are dropped as noise.
    pub min_blob_size: usize,
    /// Padding around crops, and the gap between a glyph and its outline.
    pub margin: u32,
    /// Outline thickness in pixels on the annotated image.
    pub line_width: u32,
    /// Outline colour on the annotated image.
    pub highlight: [u8; 3],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            min_blob_size: DEFAULT_MIN_BLOB_SIZE,
            margin: renderer::CROP_MARGIN,
            line_width: renderer::OUTLINE_WIDTH,
            highlight: renderer::HIGHLIGHT.0,
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON document. Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.line_width == 0 {
            return Err(SegmentationError::invalid_config(
                "line_width",
                self.line_width,
            ));
        }
        if self.margin > MAX_MARGIN {
            return Err(SegmentationError::invalid_config("margin", self.margin));
        }
        Ok(())
    }
}

/// What the storage side persists for one kept blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Position in the kept list; contiguous from 0 and stable for a given input.
    pub sequence_index: usize,
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
    pub pixel_count: usize,
}

impl BlobRecord {
    /// Suggested crop file name, `<job>_hiero_<n>.png`.
    pub fn file_name(&self, job: &str) -> String {
        format!("{}_hiero_{}.png", job, self.sequence_index)
    }
}

/// Suggested name for the annotated overview image, `<job>_surround.png`.
pub fn annotated_file_name(job: &str) -> String {
    format!("{}_surround.png", job)
}

/// The result of segmenting one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    background: u8,
    raw_blob_count: usize,
    blobs: Vec<GlyphBlob>,
}

impl Segmentation {
    pub fn background(&self) -> u8 {
        self.background
    }

    /// Kept blobs in raster discovery order.
    pub fn blobs(&self) -> &[GlyphBlob] {
        &self.blobs
    }

    /// Number of regions found before noise filtering.
    pub fn raw_blob_count(&self) -> usize {
        self.raw_blob_count
    }

    /// No glyphs found. A valid outcome, not a failure.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn records(&self) -> Vec<BlobRecord> {
        self.blobs
            .iter()
            .enumerate()
            .map(|(sequence_index, blob)| {
                let bounds = blob.bounding_box();
                BlobRecord {
                    sequence_index,
                    min_row: bounds.min_row,
                    max_row: bounds.max_row,
                    min_col: bounds.min_col,
                    max_col: bounds.max_col,
                    pixel_count: blob.len(),
                }
            })
            .collect()
    }

    /// One padded crop per kept blob, in the same order as `records()`.
    pub fn crops(&self, grid: &PixelGrid, config: &PipelineConfig) -> Result<Vec<GrayImage>> {
        self.blobs
            .iter()
            .map(|blob| renderer::crop_with_margin(grid, blob, self.background, config.margin))
            .collect()
    }

    /// An RGB copy of `grid` with every kept blob outlined. `grid` is untouched.
    pub fn annotate(&self, grid: &PixelGrid, config: &PipelineConfig) -> RgbImage {
        let mut canvas = DynamicImage::ImageLuma8(grid.to_gray_image()).to_rgb8();
        for blob in &self.blobs {
            renderer::draw_outline(
                &mut canvas,
                blob,
                config.margin,
                config.line_width,
                Rgb(config.highlight),
            );
        }
        canvas
    }
}

/// The main, top-level struct for the segmentation engine.
#[derive(Debug, Clone)]
pub struct SegmentationPipeline {
    config: PipelineConfig,
}

impl SegmentationPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn segment(&self, grid: &PixelGrid) -> Segmentation {
        // Stage 1: Background
        let background = grid.estimate_background();

        // Stage 2 & 3: Classification and Region Growing
        let raw_blobs = blob_detector::find_blobs(grid, background, self.config.tolerance);
        let raw_blob_count = raw_blobs.len();

        // Stage 4: Noise Filtering
        let blobs = filter_blobs(raw_blobs, self.config.min_blob_size);
        debug!(
            "{}x{} grid: background {}, {} regions, {} kept (min size {})",
            grid.cols(),
            grid.rows(),
            background,
            raw_blob_count,
            blobs.len(),
            self.config.min_blob_size
        );

        Segmentation {
            background,
            raw_blob_count,
            blobs,
        }
    }

    /// Validates nested rows into a grid, then segments it.
    pub fn segment_rows(&self, rows: Vec<Vec<u8>>) -> Result<Segmentation> {
        let grid = PixelGrid::from_rows(rows)?;
        Ok(self.segment(&grid))
    }
}
