use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::Result;
use image::ImageEncoder;
use std::path::Path;

/// Decodes any format the `image` crate understands into an RGBA buffer.
pub fn load(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let image = image::open(path)?.to_rgba8();
    Ok(PixelBuffer::from_rgba_image(image))
}

/// Writes `buffer` as an RGBA PNG.
pub fn save(path: impl AsRef<Path>, buffer: &PixelBuffer) -> Result<()> {
    let output = std::io::BufWriter::new(std::fs::File::create(path)?);
    let encoder = image::codecs::png::PngEncoder::new(output);

    encoder.write_image(
        buffer.as_raw(),
        buffer.width(),
        buffer.height(),
        image::ExtendedColorType::Rgba8,
    )?;

    Ok(())
}
