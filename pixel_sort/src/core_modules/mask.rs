// THEORY:
// The mask renderer is the debugging view of segmentation: every pixel becomes pure
// white if the threshold predicate calls it ON and pure black otherwise. It looks at
// pixels one at a time and deliberately ignores `min_run_length`, so the mask shows
// raw classification even where short runs end up unsorted.

use crate::config::Configuration;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::Result;

/// White for ON, black for OFF, both opaque.
pub fn mask_pixel(pixel: &Pixel, config: &Configuration) -> Pixel {
    if config.is_on(config.criterion.key(pixel)) {
        Pixel::WHITE
    } else {
        Pixel::BLACK
    }
}

/// Allocates a same-size buffer holding the binary mask of `buffer`.
pub fn render_mask(buffer: &PixelBuffer, config: &Configuration) -> Result<PixelBuffer> {
    let mut output = PixelBuffer::new(buffer.width(), buffer.height());
    {
        let mut access = output.load_pixels();
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                access.set_pixel(x, y, mask_pixel(&buffer.get_pixel(x, y)?, config))?;
            }
        }
    }
    Ok(output)
}
