pub mod animator;
pub mod criterion;
pub mod mask;
pub mod pixel;
pub mod pixel_buffer;
pub mod segmenter;
pub mod sorter;
