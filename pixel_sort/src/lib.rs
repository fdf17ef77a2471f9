// THEORY:
// This file is the main entry point for the `pixel_sort` library crate. It exports
// a small engine that "pixel sorts" RGBA frames: each row or column is split into
// ON/OFF runs by a threshold on brightness, hue or saturation, ON runs are reordered
// by that same key, and OFF runs are left exactly as they were.
//
// The public surface is the pair of pipelines (`SortPipeline` for a synchronous
// pass, `ParallelPipeline` for a tokio worker pool), the explicit `Configuration`
// they read, and the `controls::Session` a host drives between frames. The engine
// never loads, decodes or displays anything itself beyond the optional helpers in
// `utils::image_helper`.

pub mod config;
pub mod controls;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;
pub mod utils;

pub use config::{Configuration, Direction, Interpolation, LEGACY_MIN_RUN_LENGTH, SortOrder};
pub use controls::{Control, Effect, Session};
pub use core_modules::animator::{AnimationKind, AnimationState, Animator};
pub use core_modules::criterion::{Criterion, Key};
pub use core_modules::pixel::pixel::Pixel;
pub use core_modules::pixel_buffer::{PixelAccess, PixelBuffer};
pub use error::{Result, SortError};
pub use parallel_pipeline::ParallelPipeline;
pub use pipeline::{PassReport, SortPipeline};
