// THEORY:
// `PixelBuffer` is the addressable 2-D grid the host hands us: width x height RGBA
// pixels, row-major, 4 bytes each, no padding. It stores the raw bytes exactly as
// the host supplied them so untouched pixels come back byte-identical.
//
// Key architectural principles:
// 1.  **Lines, not pixels**: the sorting engine only ever works on a *line* (a row
//     in horizontal mode, a column in vertical mode). `get_line`/`set_line` are the
//     bridge between the flat byte storage and that 1-D view.
// 2.  **Scoped access**: bulk work goes through `load_pixels()`, which decodes the
//     storage once into a `PixelAccess` guard. All gets and sets hit the decoded
//     pixels; the guard flushes back to bytes when it is dropped, so every exit path
//     (including `?` early returns) leaves the buffer consistent.
// 3.  **Checked coordinates**: out-of-range access is a caller bug and surfaces as
//     `SortError::InvalidCoordinate` instead of a panic.

use crate::config::Direction;
use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::error::{Result, SortError};
use image::RgbaImage;

/// An owned RGBA frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A fully transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    /// Wraps raw RGBA bytes, checking the length.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(SortError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a buffer from row-major pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Pixel]) -> Result<Self> {
        let data = pixels
            .iter()
            .flat_map(|pixel| <[u8; CHANNELS]>::from(*pixel))
            .collect();
        Self::from_raw(width, height, data)
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub fn into_rgba_image(self) -> RgbaImage {
        // Length is guaranteed by every constructor, so this cannot fail.
        RgbaImage::from_raw(self.width, self.height, self.data)
            .unwrap_or_else(|| RgbaImage::new(0, 0))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Number of lines a pass walks in `direction`.
    pub fn line_count(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Horizontal => self.height,
            Direction::Vertical => self.width,
        }
    }

    /// Number of pixels in each line in `direction`.
    pub fn line_length(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Horizontal => self.width,
            Direction::Vertical => self.height,
        }
    }

    fn byte_index(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(SortError::InvalidCoordinate {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Pixel> {
        let index = self.byte_index(x, y)?;
        let bytes = &self.data[index..index + CHANNELS];
        Ok(Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<()> {
        let index = self.byte_index(x, y)?;
        self.data[index..index + CHANNELS].copy_from_slice(&<[u8; CHANNELS]>::from(pixel));
        Ok(())
    }

    /// Copies one row or column out of the buffer.
    pub fn get_line(&self, index: u32, direction: Direction) -> Result<Vec<Pixel>> {
        self.check_line(index, direction)?;
        (0..self.line_length(direction))
            .map(|position| {
                let (x, y) = line_coordinates(index, position, direction);
                self.get_pixel(x, y)
            })
            .collect()
    }

    /// Writes a full line back at its original coordinates.
    pub fn set_line(&mut self, index: u32, direction: Direction, pixels: &[Pixel]) -> Result<()> {
        self.check_line(index, direction)?;
        check_line_length(self.line_length(direction), pixels)?;
        for (position, pixel) in pixels.iter().enumerate() {
            let (x, y) = line_coordinates(index, position as u32, direction);
            self.set_pixel(x, y, *pixel)?;
        }
        Ok(())
    }

    fn check_line(&self, index: u32, direction: Direction) -> Result<()> {
        let lines = self.line_count(direction);
        if index >= lines {
            return Err(SortError::LineIndex { index, lines });
        }
        Ok(())
    }

    /// Decodes the storage for bulk access. Changes are flushed when the guard drops.
    pub fn load_pixels(&mut self) -> PixelAccess<'_> {
        let pixels = self
            .data
            .chunks_exact(CHANNELS)
            .map(|bytes| Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3]))
            .collect();
        PixelAccess {
            buffer: self,
            pixels,
            dirty: false,
        }
    }
}

/// (x, y) of the pixel at `position` along line `index`.
#[inline]
pub fn line_coordinates(index: u32, position: u32, direction: Direction) -> (u32, u32) {
    match direction {
        Direction::Horizontal => (position, index),
        Direction::Vertical => (index, position),
    }
}

fn check_line_length(expected: u32, pixels: &[Pixel]) -> Result<()> {
    if pixels.len() != expected as usize {
        return Err(SortError::LineLength {
            expected: expected as usize,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Decoded, writable view of a `PixelBuffer`. Flushes on drop.
pub struct PixelAccess<'a> {
    buffer: &'a mut PixelBuffer,
    pixels: Vec<Pixel>,
    dirty: bool,
}

impl PixelAccess<'_> {
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    pub fn line_count(&self, direction: Direction) -> u32 {
        self.buffer.line_count(direction)
    }

    fn pixel_index(&self, x: u32, y: u32) -> Result<usize> {
        self.buffer
            .byte_index(x, y)
            .map(|byte_index| byte_index / CHANNELS)
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Pixel> {
        Ok(self.pixels[self.pixel_index(x, y)?])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<()> {
        let index = self.pixel_index(x, y)?;
        self.pixels[index] = pixel;
        self.dirty = true;
        Ok(())
    }

    pub fn get_line(&self, index: u32, direction: Direction) -> Result<Vec<Pixel>> {
        self.buffer.check_line(index, direction)?;
        let length = self.buffer.line_length(direction);
        match direction {
            Direction::Horizontal => {
                let start = index as usize * length as usize;
                Ok(self.pixels[start..start + length as usize].to_vec())
            }
            Direction::Vertical => (0..length)
                .map(|position| self.get_pixel(index, position))
                .collect(),
        }
    }

    pub fn set_line(&mut self, index: u32, direction: Direction, pixels: &[Pixel]) -> Result<()> {
        self.buffer.check_line(index, direction)?;
        let length = self.buffer.line_length(direction);
        check_line_length(length, pixels)?;
        match direction {
            Direction::Horizontal => {
                let start = index as usize * length as usize;
                self.pixels[start..start + length as usize].copy_from_slice(pixels);
                self.dirty = true;
            }
            Direction::Vertical => {
                for (position, pixel) in pixels.iter().enumerate() {
                    self.set_pixel(index, position as u32, *pixel)?;
                }
            }
        }
        Ok(())
    }

    /// Writes pending changes back to the byte storage now.
    pub fn update_pixels(&mut self) {
        if !self.dirty {
            return;
        }
        for (bytes, pixel) in self
            .buffer
            .data
            .chunks_exact_mut(CHANNELS)
            .zip(self.pixels.iter())
        {
            bytes.copy_from_slice(&<[u8; CHANNELS]>::from(*pixel));
        }
        self.dirty = false;
    }
}

impl Drop for PixelAccess<'_> {
    fn drop(&mut self) {
        self.update_pixels();
    }
}
