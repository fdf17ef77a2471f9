// THEORY:
// The `pipeline` module is the top-level API of the sorting engine. It runs one
// complete pass over a frame: every line is segmented, its ON runs are sorted, an
// optional animation frame is blended in, and the result is written back at the
// same coordinates. The mask renderer is exposed here too as the parallel path over
// the same predicate.
//
// There is a single engine. The plain sort, the run-length-limited sort and the
// animated transition are all the same pass with a different `Configuration` and
// an optional progress value.

use crate::config::Configuration;
use crate::core_modules::animator::{AnimationState, Animator};
use crate::core_modules::mask;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::segmenter::{Run, segment};
use crate::core_modules::sorter::sort_line;
use crate::error::Result;
use log::{debug, trace};
use std::ops::AddAssign;

// Re-export key data structures for the public API.
pub use crate::config::{Direction, Interpolation, SortOrder};
pub use crate::core_modules::animator::AnimationKind;
pub use crate::core_modules::criterion::Criterion;

/// Counters for a single line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub runs: usize,
    pub sorted_runs: usize,
    pub demoted_runs: usize,
    pub sorted_pixels: usize,
}

impl LineStats {
    fn from_runs(runs: &[Run]) -> Self {
        let sorted = runs.iter().filter(|run| run.is_sortable());
        LineStats {
            runs: runs.len(),
            sorted_runs: sorted.clone().count(),
            demoted_runs: runs.iter().filter(|run| run.demoted).count(),
            sorted_pixels: sorted.map(Run::len).sum(),
        }
    }
}

/// Summary of one full pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub lines: usize,
    pub runs: usize,
    pub sorted_runs: usize,
    pub demoted_runs: usize,
    pub sorted_pixels: usize,
}

impl AddAssign<LineStats> for PassReport {
    fn add_assign(&mut self, stats: LineStats) {
        self.lines += 1;
        self.runs += stats.runs;
        self.sorted_runs += stats.sorted_runs;
        self.demoted_runs += stats.demoted_runs;
        self.sorted_pixels += stats.sorted_pixels;
    }
}

/// Segments, sorts and optionally animates one line.
///
/// `progress` of `None` means the fully sorted line.
pub fn process_line(
    line: &[Pixel],
    config: &Configuration,
    progress: Option<f32>,
) -> (Vec<Pixel>, LineStats) {
    let runs = segment(line, config);
    let stats = LineStats::from_runs(&runs);
    let sorted = sort_line(&runs, config.order);

    let output = match progress {
        Some(progress) => Animator::new(config.interpolation).interpolate(line, &sorted, progress),
        None => sorted.pixels,
    };
    (output, stats)
}

/// The sequential engine.
#[derive(Debug, Default)]
pub struct SortPipeline {
    last_report: PassReport,
}

impl SortPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts `buffer` in place under `config`.
    pub fn process(&mut self, buffer: &mut PixelBuffer, config: &Configuration) -> Result<PassReport> {
        self.run_pass(buffer, config, None)
    }

    /// Renders one display frame: fully sorted, or interpolated when the animation
    /// is running in sort-progress mode.
    pub fn render_frame(
        &mut self,
        buffer: &mut PixelBuffer,
        config: &Configuration,
        animation: &AnimationState,
    ) -> Result<PassReport> {
        self.run_pass(buffer, config, animation.frame_progress())
    }

    /// Mask-debug output for `buffer`; does not touch the input.
    pub fn render_mask(&self, buffer: &PixelBuffer, config: &Configuration) -> Result<PixelBuffer> {
        mask::render_mask(buffer, config)
    }

    fn run_pass(
        &mut self,
        buffer: &mut PixelBuffer,
        config: &Configuration,
        progress: Option<f32>,
    ) -> Result<PassReport> {
        let mut report = PassReport::default();
        {
            let mut access = buffer.load_pixels();
            for index in 0..access.line_count(config.direction) {
                let line = access.get_line(index, config.direction)?;
                let (output, stats) = process_line(&line, config, progress);
                trace!("line {}: {:?}", index, stats);
                access.set_line(index, config.direction, &output)?;
                report += stats;
            }
        }

        debug!(
            "Pass {} ({:?}): {} lines, {} runs, {} sorted, {} demoted",
            config, progress, report.lines, report.runs, report.sorted_runs, report.demoted_runs
        );
        self.last_report = report;
        Ok(report)
    }

    pub fn get_last_report(&self) -> &PassReport {
        &self.last_report
    }
}
