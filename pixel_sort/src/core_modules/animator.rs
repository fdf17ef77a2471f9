// THEORY:
// The animator is an optional decorator over the sorter. Given a line before sorting,
// the same line fully sorted, and a progress value in [0, 1], it produces the frame
// in between. Neither input is mutated.
//
// Two interpolations are offered:
// - Blend: every sorted slot linearly blends its original color toward its sorted
//   color. One write per slot, so there are never collisions or gaps.
// - Travel: each pixel of a sorted run moves along `floor(i + (target - i) * p)`,
//   drawn over the Blend frame. Mid-transition positions can collide (last write
//   wins) and leave slots showing the blended backdrop.
// Both are exact at the endpoints: progress 0 is the original line and progress 1
// is the sorted line.
//
// `AnimationState` is the frame clock. It is independent of `Configuration` and is
// advanced by the host once per frame.

use crate::config::Interpolation;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::sorter::SortedLine;
use serde::{Deserialize, Serialize};

pub const MIN_SPEED: f32 = 0.001;
pub const MAX_SPEED: f32 = 0.05;
pub const DEFAULT_SPEED: f32 = 0.01;
pub const SPEED_STEP: f32 = 0.005;

/// What a running animation changes from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    /// Interpolate between the original and sorted arrangement.
    #[default]
    SortProgress,
    /// Keep sorting fully, but raise the threshold a little every frame.
    ThresholdSweep,
}

impl AnimationKind {
    pub fn next(self) -> Self {
        match self {
            AnimationKind::SortProgress => AnimationKind::ThresholdSweep,
            AnimationKind::ThresholdSweep => AnimationKind::SortProgress,
        }
    }
}

/// Frame clock for the animated variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationState {
    /// Blend factor in [0, 1).
    pub progress: f32,
    /// Progress added per frame, in [MIN_SPEED, MAX_SPEED].
    pub speed: f32,
    pub enabled: bool,
    pub kind: AnimationKind,
}

impl Default for AnimationState {
    fn default() -> Self {
        AnimationState {
            progress: 0.0,
            speed: DEFAULT_SPEED,
            enabled: false,
            kind: AnimationKind::SortProgress,
        }
    }
}

impl AnimationState {
    /// Advances progress by one frame, wrapping modulo 1.0.
    pub fn advance(&mut self) {
        self.progress = (self.progress + self.speed) % 1.0;
    }

    /// Moves speed by `steps` increments, clamped to the allowed band.
    pub fn adjust_speed(&mut self, steps: i32) {
        self.speed = (self.speed + SPEED_STEP * steps as f32).clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Progress the renderer should use this frame, if the frame is interpolated.
    pub fn frame_progress(&self) -> Option<f32> {
        (self.enabled && self.kind == AnimationKind::SortProgress).then_some(self.progress)
    }
}

/// Builds in-between lines from an original and its sorted counterpart.
#[derive(Debug, Clone, Copy, Default)]
pub struct Animator {
    pub interpolation: Interpolation,
}

impl Animator {
    pub fn new(interpolation: Interpolation) -> Self {
        Animator { interpolation }
    }

    /// Per-pixel blended position `i + (target - i) * progress`, by original index.
    pub fn trajectories(sorted: &SortedLine, progress: f32) -> Vec<f32> {
        let progress = progress.clamp(0.0, 1.0);
        sorted
            .targets
            .iter()
            .enumerate()
            .map(|(index, target)| index as f32 + (*target as f32 - index as f32) * progress)
            .collect()
    }

    /// The line as it looks at `progress` of the way from `original` to `sorted`.
    pub fn interpolate(&self, original: &[Pixel], sorted: &SortedLine, progress: f32) -> Vec<Pixel> {
        let progress = progress.clamp(0.0, 1.0);
        let mut frame = original.to_vec();

        for span in &sorted.sorted_spans {
            for index in span.clone() {
                frame[index] = original[index].lerp(&sorted.pixels[index], progress);
            }
        }

        if self.interpolation == Interpolation::Travel {
            let positions = Self::trajectories(sorted, progress);
            for span in &sorted.sorted_spans {
                for index in span.clone() {
                    // Trajectories stay inside the run, so the floor is always in range.
                    let slot = (positions[index].floor() as usize).clamp(span.start, span.end - 1);
                    frame[slot] = original[index].opaque();
                }
            }
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, SortOrder};
    use crate::core_modules::segmenter::segment;
    use crate::core_modules::sorter::sort_line;

    fn fixture() -> (Vec<Pixel>, SortedLine) {
        let config = Configuration::default().with_threshold(100.0);
        let original = vec![
            Pixel::gray(10),
            Pixel::rgb(250, 240, 230),
            Pixel::gray(120),
            Pixel::rgb(200, 180, 160),
            Pixel::new(20, 20, 20, 90),
        ];
        let sorted = sort_line(&segment(&original, &config), SortOrder::Ascending);
        (original, sorted)
    }

    #[test]
    fn endpoints_are_exact_for_both_interpolations() {
        let (original, sorted) = fixture();
        for interpolation in [Interpolation::Blend, Interpolation::Travel] {
            let animator = Animator::new(interpolation);
            let start = animator.interpolate(&original, &sorted, 0.0);
            let end = animator.interpolate(&original, &sorted, 1.0);
            for (index, pixel) in start.iter().enumerate() {
                if sorted.is_sorted_slot(index) {
                    assert_eq!(*pixel, original[index].opaque());
                } else {
                    assert_eq!(*pixel, original[index]);
                }
            }
            assert_eq!(end, sorted.pixels);
        }
    }

    #[test]
    fn blend_mixes_colors_per_slot() {
        let (original, sorted) = fixture();
        let half = Animator::new(Interpolation::Blend).interpolate(&original, &sorted, 0.5);
        assert_eq!(half[1], original[1].lerp(&sorted.pixels[1], 0.5));
        assert_eq!(half[0], original[0]);
        assert_eq!(half[4], original[4]);
        assert!(half.iter().skip(1).take(3).all(|p| p.alpha == 255));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let (original, sorted) = fixture();
        let before = (original.clone(), sorted.clone());
        let _ = Animator::new(Interpolation::Travel).interpolate(&original, &sorted, 0.37);
        assert_eq!((original, sorted), before);
    }

    #[test]
    fn trajectories_move_linearly_toward_targets() {
        let (_, sorted) = fixture();
        let positions = Animator::trajectories(&sorted, 0.5);
        for (index, position) in positions.iter().enumerate() {
            let target = sorted.targets[index] as f32;
            assert!((position - (index as f32 + target) / 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn progress_wraps_modulo_one() {
        let mut state = AnimationState {
            progress: 0.98,
            speed: 0.05,
            enabled: true,
            ..AnimationState::default()
        };
        state.advance();
        assert!((state.progress - 0.03).abs() < 1e-5);
        assert_eq!(state.frame_progress(), Some(state.progress));
    }

    #[test]
    fn speed_is_bounded() {
        let mut state = AnimationState::default();
        state.adjust_speed(100);
        assert_eq!(state.speed, MAX_SPEED);
        state.adjust_speed(-100);
        assert_eq!(state.speed, MIN_SPEED);
    }

    #[test]
    fn disabled_or_sweeping_animation_renders_fully_sorted() {
        let mut state = AnimationState::default();
        assert_eq!(state.frame_progress(), None);
        state.enabled = true;
        state.kind = AnimationKind::ThresholdSweep;
        assert_eq!(state.frame_progress(), None);
    }
}
