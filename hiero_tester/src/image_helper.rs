pub mod image_helper {
    use anyhow::{Context, Result};
    use image::{GrayImage, ImageEncoder, RgbImage};
    use std::path::Path;

    /// Decodes any format the `image` crate understands and converts it to 8-bit grayscale.
    pub fn load_grayscale(path: &Path) -> Result<GrayImage> {
        let image = image::open(path)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        Ok(image.to_luma8())
    }

    pub fn save_gray(path: &Path, image: &GrayImage) -> Result<()> {
        save(
            path,
            image.width(),
            image.height(),
            image.as_raw(),
            image::ExtendedColorType::L8,
        )
    }

    pub fn save_rgb(path: &Path, image: &RgbImage) -> Result<()> {
        save(
            path,
            image.width(),
            image.height(),
            image.as_raw(),
            image::ExtendedColorType::Rgb8,
        )
    }

    fn save(
        path: &Path,
        width: u32,
        height: u32,
        buffer: &[u8],
        color: image::ExtendedColorType,
    ) -> Result<()> {
        let output = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let encoder = image::codecs::png::PngEncoder::new(std::io::BufWriter::new(output));

        encoder
            .write_image(buffer, width, height, color)
            .with_context(|| format!("failed to encode {}", path.display()))?;

        Ok(())
    }
}
