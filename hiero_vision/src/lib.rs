// THEORY:
// This file is the main entry point for the `hiero_vision` library crate.
// It exports the `SegmentationPipeline` and its data structures as the
// high-level interface for isolating individual hieroglyphs in a grayscale
// scan. The `core_modules` stay public for callers that want a single stage
// (just the region grower, just the renderer), but most code should only need
// the pipeline.
//
// The crate never touches the filesystem. Decoding uploads, naming and storing
// files, and persisting records are the caller's job; see `hiero_tester` for a
// minimal caller.

pub mod batch_pipeline;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use batch_pipeline::{BatchConfig, BatchJob, BatchOutcome, BatchPipeline};
pub use core_modules::glyph_blob::{BoundingBox, GlyphBlob, Point};
pub use core_modules::pixel_grid::PixelGrid;
pub use error::{Result, SegmentationError};
pub use pipeline::{
    BlobRecord, PipelineConfig, Segmentation, SegmentationPipeline, annotated_file_name,
};
