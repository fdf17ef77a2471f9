use thiserror::Error;

/// Everything the engine can report back to a host.
#[derive(Debug, Error)]
pub enum SortError {
    /// A pixel coordinate fell outside the buffer.
    #[error("coordinate ({x}, {y}) is outside a {width}x{height} buffer")]
    InvalidCoordinate { x: u32, y: u32, width: u32, height: u32 },

    /// Raw storage does not hold width * height * 4 bytes.
    #[error("buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// A line written back has the wrong number of pixels.
    #[error("line holds {actual} pixels, expected {expected}")]
    LineLength { expected: usize, actual: usize },

    /// A row or column index past the last line.
    #[error("line {index} requested but the buffer has {lines} lines")]
    LineIndex { index: u32, lines: u32 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A parallel worker panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, SortError>;
