// THEORY:
// The control surface is where host input (key presses, UI buttons) becomes
// configuration changes. Every trigger maps 1:1 onto one mutation of the session,
// and all of them happen between frames, never during a pass.
//
// `Session` bundles what the host needs to keep across frames: the configuration,
// the animation clock, whether the mask view is showing, and which of the loaded
// source images is current.

use crate::config::{Configuration, SortOrder};
use crate::core_modules::animator::{AnimationKind, AnimationState};
use crate::core_modules::criterion::Criterion;
use log::info;

/// Threshold sweep moves this fraction of the range per frame.
const SWEEP_STEPS: f32 = 1000.0;

/// A single host trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ToggleMask,
    ToggleDirection,
    ToggleOrder,
    ThresholdUp,
    ThresholdDown,
    SelectCriterion(Criterion),
    ToggleAnimation,
    CycleAnimationKind,
    SpeedUp,
    SpeedDown,
    Reset,
    NextImage,
    PrevImage,
}

impl Control {
    /// The default key bindings.
    pub fn from_key(key: char) -> Option<Control> {
        let control = match key.to_ascii_lowercase() {
            'm' => Control::ToggleMask,
            'v' => Control::ToggleDirection,
            's' => Control::ToggleOrder,
            '+' => Control::ThresholdUp,
            '-' => Control::ThresholdDown,
            '1' => Control::SelectCriterion(Criterion::Brightness),
            '2' => Control::SelectCriterion(Criterion::Hue),
            '3' => Control::SelectCriterion(Criterion::Saturation),
            'a' => Control::ToggleAnimation,
            't' => Control::CycleAnimationKind,
            ']' => Control::SpeedUp,
            '[' => Control::SpeedDown,
            'r' => Control::Reset,
            '>' => Control::NextImage,
            '<' => Control::PrevImage,
            _ => return None,
        };
        Some(control)
    }
}

/// What the host has to do after a control was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Settings changed; re-render the current image.
    Reconfigured,
    /// A different source image is now current and must be reprocessed.
    ImageChanged(usize),
    Unchanged,
}

/// Host-side state carried between frames.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: Configuration,
    pub animation: AnimationState,
    pub show_mask: bool,
    image_count: usize,
    image_index: usize,
}

impl Session {
    pub fn new(config: Configuration, image_count: usize) -> Self {
        Session {
            config,
            animation: AnimationState::default(),
            show_mask: false,
            image_count,
            image_index: 0,
        }
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn apply(&mut self, control: Control) -> Effect {
        let effect = match control {
            Control::ToggleMask => {
                self.show_mask = !self.show_mask;
                Effect::Reconfigured
            }
            Control::ToggleDirection => {
                self.config.direction = self.config.direction.toggled();
                Effect::Reconfigured
            }
            Control::ToggleOrder => {
                self.config.order = self.config.order.toggled();
                Effect::Reconfigured
            }
            Control::ThresholdUp => {
                self.config.step_threshold(1);
                Effect::Reconfigured
            }
            Control::ThresholdDown => {
                self.config.step_threshold(-1);
                Effect::Reconfigured
            }
            Control::SelectCriterion(criterion) => {
                self.config.set_criterion(criterion);
                Effect::Reconfigured
            }
            Control::ToggleAnimation => {
                self.animation.enabled = !self.animation.enabled;
                Effect::Reconfigured
            }
            Control::CycleAnimationKind => {
                self.animation.kind = self.animation.kind.next();
                Effect::Reconfigured
            }
            Control::SpeedUp => {
                self.animation.adjust_speed(1);
                Effect::Reconfigured
            }
            Control::SpeedDown => {
                self.animation.adjust_speed(-1);
                Effect::Reconfigured
            }
            Control::Reset => {
                self.config = Configuration::default();
                self.animation = AnimationState::default();
                self.show_mask = false;
                Effect::Reconfigured
            }
            Control::NextImage => self.cycle_image(1),
            Control::PrevImage => self.cycle_image(-1),
        };
        info!("{:?} -> {:?}; {}", control, effect, self.config);
        effect
    }

    fn cycle_image(&mut self, step: isize) -> Effect {
        if self.image_count == 0 {
            return Effect::Unchanged;
        }
        let count = self.image_count as isize;
        self.image_index = (self.image_index as isize + step).rem_euclid(count) as usize;
        Effect::ImageChanged(self.image_index)
    }

    /// Advances the animation by one frame, if it is running.
    pub fn tick(&mut self) {
        if !self.animation.enabled {
            return;
        }
        match self.animation.kind {
            AnimationKind::SortProgress => self.animation.advance(),
            AnimationKind::ThresholdSweep => {
                let criterion = self.config.criterion;
                self.config.threshold =
                    criterion.clamp(self.config.threshold + criterion.max() / SWEEP_STEPS);
            }
        }
    }

    /// Status lines for a host overlay.
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!(
                "Threshold: {:.3}, {:.1}%",
                self.config.threshold,
                self.config.threshold_ratio() * 100.0
            ),
            format!("Direction: {:?}", self.config.direction),
            format!(
                "Sorting Order: {}",
                match self.config.order {
                    SortOrder::Ascending => "Low to High",
                    SortOrder::Descending => "High to Low",
                }
            ),
            format!("Sorting Criteria: {}", self.config.criterion),
            format!(
                "Animation: {} ({:?}, speed {:.3})",
                if self.animation.enabled { "Yes" } else { "No" },
                self.animation.kind,
                self.animation.speed
            ),
            format!("Current Image: {} / {}", self.image_index + 1, self.image_count),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Direction;

    #[test]
    fn key_bindings_cover_every_trigger() {
        assert_eq!(Control::from_key('M'), Some(Control::ToggleMask));
        assert_eq!(
            Control::from_key('2'),
            Some(Control::SelectCriterion(Criterion::Hue))
        );
        assert_eq!(Control::from_key(']'), Some(Control::SpeedUp));
        assert_eq!(Control::from_key('x'), None);
    }

    #[test]
    fn toggles_flip_and_flip_back() {
        let mut session = Session::new(Configuration::default(), 1);
        session.apply(Control::ToggleDirection);
        session.apply(Control::ToggleOrder);
        session.apply(Control::ToggleMask);
        assert_eq!(session.config.direction, Direction::Vertical);
        assert_eq!(session.config.order, SortOrder::Descending);
        assert!(session.show_mask);
        session.apply(Control::ToggleDirection);
        assert_eq!(session.config.direction, Direction::Horizontal);
    }

    #[test]
    fn threshold_controls_saturate() {
        let mut session = Session::new(Configuration::default(), 1);
        session.apply(Control::ThresholdDown);
        assert_eq!(session.config.threshold, 0.0);
        for _ in 0..150 {
            session.apply(Control::ThresholdUp);
        }
        assert_eq!(session.config.threshold, 255.0);
    }

    #[test]
    fn reset_restores_defaults_but_keeps_image() {
        let mut session = Session::new(Configuration::default(), 3);
        session.apply(Control::NextImage);
        session.apply(Control::ThresholdUp);
        session.apply(Control::ToggleAnimation);
        session.apply(Control::SelectCriterion(Criterion::Saturation));
        assert_eq!(session.apply(Control::Reset), Effect::Reconfigured);
        assert_eq!(session.config, Configuration::default());
        assert_eq!(session.animation, AnimationState::default());
        assert_eq!(session.image_index(), 1);
    }

    #[test]
    fn image_cycling_wraps_both_ways() {
        let mut session = Session::new(Configuration::default(), 3);
        assert_eq!(session.apply(Control::PrevImage), Effect::ImageChanged(2));
        assert_eq!(session.apply(Control::NextImage), Effect::ImageChanged(0));

        let mut empty = Session::new(Configuration::default(), 0);
        assert_eq!(empty.apply(Control::NextImage), Effect::Unchanged);
    }

    #[test]
    fn tick_advances_only_when_enabled() {
        let mut session = Session::new(Configuration::default(), 1);
        session.tick();
        assert_eq!(session.animation.progress, 0.0);

        session.apply(Control::ToggleAnimation);
        session.tick();
        assert!(session.animation.progress > 0.0);

        session.apply(Control::CycleAnimationKind);
        let before = session.config.threshold;
        session.tick();
        assert!((session.config.threshold - before - 0.255).abs() < 1e-4);
    }

    #[test]
    fn summary_reports_current_image() {
        let mut session = Session::new(Configuration::default(), 2);
        session.apply(Control::NextImage);
        let summary = session.summary();
        assert_eq!(summary.last().map(String::as_str), Some("Current Image: 2 / 2"));
        assert!(summary[0].starts_with("Threshold: 0.000"));
    }
}
