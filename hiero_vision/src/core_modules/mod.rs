pub mod blob_detector;
pub mod glyph_blob;
pub mod pixel_grid;
pub mod pixel_state;
pub mod renderer;
