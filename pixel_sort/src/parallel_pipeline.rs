// THEORY:
// Lines are embarrassingly parallel: a line's runs and sorted output only ever
// touch that line's pixels. The parallel pipeline exploits this by cutting the
// line indices into contiguous bands and handing each band to a blocking worker
// task. Workers read from a shared, immutable snapshot of the frame and return
// their finished lines; the caller writes them back in line order.
//
// Output is byte-identical to `SortPipeline`. The configuration is cloned once
// into an `Arc` at the start of the pass, so it cannot change mid-frame.

use crate::config::Configuration;
use crate::core_modules::animator::AnimationState;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::{Result, SortError};
use crate::pipeline::{LineStats, PassReport, process_line};
use futures::future::join_all;
use log::debug;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

/// Lines finished by one worker, in index order.
type BandResult = Result<Vec<(u32, Vec<Pixel>, LineStats)>>;

pub struct ParallelPipeline {
    workers: usize,
}

impl Default for ParallelPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelPipeline {
    /// One worker per logical CPU.
    pub fn new() -> Self {
        Self::with_workers(num_cpus::get())
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Sorts `buffer` across the worker pool and hands it back.
    pub async fn process(
        &self,
        buffer: PixelBuffer,
        config: &Configuration,
    ) -> Result<(PixelBuffer, PassReport)> {
        self.run_pass(buffer, config, None).await
    }

    /// Parallel counterpart of `SortPipeline::render_frame`.
    pub async fn render_frame(
        &self,
        buffer: PixelBuffer,
        config: &Configuration,
        animation: &AnimationState,
    ) -> Result<(PixelBuffer, PassReport)> {
        self.run_pass(buffer, config, animation.frame_progress()).await
    }

    fn bands(&self, lines: u32) -> Vec<Range<u32>> {
        let band_size = lines.div_ceil(self.workers as u32).max(1);
        (0..lines)
            .step_by(band_size as usize)
            .map(|start| start..(start + band_size).min(lines))
            .collect()
    }

    async fn run_pass(
        &self,
        buffer: PixelBuffer,
        config: &Configuration,
        progress: Option<f32>,
    ) -> Result<(PixelBuffer, PassReport)> {
        let started = Instant::now();
        let direction = config.direction;
        let lines = buffer.line_count(direction);
        let snapshot = Arc::new(buffer);
        let config = Arc::new(config.clone());

        let tasks = self.bands(lines).into_iter().map(|band| {
            let snapshot = Arc::clone(&snapshot);
            let config = Arc::clone(&config);
            tokio::task::spawn_blocking(move || -> BandResult {
                band.map(|index| -> Result<(u32, Vec<Pixel>, LineStats)> {
                    let line = snapshot.get_line(index, config.direction)?;
                    let (output, stats) = process_line(&line, &config, progress);
                    Ok((index, output, stats))
                })
                .collect()
            })
        });
        let results = join_all(tasks).await;

        // All workers have finished, so the snapshot is normally uniquely owned again.
        let mut buffer = Arc::try_unwrap(snapshot).unwrap_or_else(|shared| (*shared).clone());
        let mut report = PassReport::default();
        {
            let mut access = buffer.load_pixels();
            for joined in results {
                let band = joined.map_err(|error| SortError::Worker(error.to_string()))??;
                for (index, output, stats) in band {
                    access.set_line(index, direction, &output)?;
                    report += stats;
                }
            }
        }

        debug!(
            "Parallel pass over {} lines on {} workers took {:?}: {} sorted runs",
            lines,
            self.workers,
            started.elapsed(),
            report.sorted_runs
        );
        Ok((buffer, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Direction, SortOrder};
    use crate::core_modules::criterion::Criterion;
    use crate::pipeline::SortPipeline;

    fn noisy_buffer(width: u32, height: u32) -> PixelBuffer {
        let pixels: Vec<Pixel> = (0..width * height)
            .map(|i| {
                Pixel::rgb(
                    (i.wrapping_mul(73) % 256) as u8,
                    (i.wrapping_mul(151) % 256) as u8,
                    (i.wrapping_mul(29) % 256) as u8,
                )
            })
            .collect();
        PixelBuffer::from_pixels(width, height, &pixels).expect("sized correctly")
    }

    #[test]
    fn bands_cover_every_line_once() {
        let pipeline = ParallelPipeline::with_workers(4);
        let bands = pipeline.bands(10);
        let covered: Vec<u32> = bands.iter().cloned().flatten().collect();
        assert_eq!(covered, (0..10).collect::<Vec<_>>());
        assert!(bands.len() <= 4);
        assert!(ParallelPipeline::with_workers(3).bands(0).is_empty());
    }

    #[tokio::test]
    async fn matches_the_sequential_pipeline() {
        let configs = [
            Configuration::default().with_threshold(90.0),
            Configuration::default()
                .with_criterion(Criterion::Hue)
                .with_threshold(150.0)
                .with_direction(Direction::Vertical)
                .with_order(SortOrder::Descending),
            Configuration::default()
                .with_criterion(Criterion::Saturation)
                .with_threshold(0.3)
                .with_min_run_length(2),
        ];
        for config in configs {
            let mut expected = noisy_buffer(17, 11);
            let sequential = SortPipeline::new()
                .process(&mut expected, &config)
                .expect("sequential pass");

            let (actual, parallel) = ParallelPipeline::with_workers(4)
                .process(noisy_buffer(17, 11), &config)
                .await
                .expect("parallel pass");
            assert_eq!(actual, expected);
            assert_eq!(parallel, sequential);
        }
    }

    #[tokio::test]
    async fn animated_frames_match_too() {
        let config = Configuration::default().with_threshold(60.0);
        let animation = AnimationState {
            progress: 0.4,
            enabled: true,
            ..AnimationState::default()
        };

        let mut expected = noisy_buffer(9, 7);
        SortPipeline::new()
            .render_frame(&mut expected, &config, &animation)
            .expect("sequential frame");
        let (actual, _) = ParallelPipeline::with_workers(3)
            .render_frame(noisy_buffer(9, 7), &config, &animation)
            .await
            .expect("parallel frame");
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn empty_buffer_is_a_no_op() {
        let (buffer, report) = ParallelPipeline::new()
            .process(PixelBuffer::new(0, 0), &Configuration::default())
            .await
            .expect("nothing to do");
        assert!(buffer.is_empty());
        assert_eq!(report, PassReport::default());
    }
}
