// THEORY:
// `Configuration` is the explicit, per-pass value that replaces what would otherwise
// be a pile of global flags. The host mutates it between frames (usually through
// `controls::Session`) and hands a shared reference to each pass; nothing inside a
// pass can change it, so a frame never sees a half-updated threshold or criterion.
//
// The threshold always lives inside the current criterion's range. Requests outside
// the range saturate at the bound instead of failing.

use crate::core_modules::criterion::{Criterion, Key};
use crate::error::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Run-length cutoff used by the older sorting variants.
pub const LEGACY_MIN_RUN_LENGTH: usize = 5;

/// Number of threshold steps that span a criterion's full range.
pub const THRESHOLD_STEPS: Key = 100.0;

/// Whether lines are rows or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Lines are rows, index 0 is the leftmost pixel.
    #[default]
    Horizontal,
    /// Lines are columns, index 0 is the topmost pixel.
    Vertical,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

/// Key order inside a sorted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Low to high.
    #[default]
    Ascending,
    /// High to low.
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// How the animated variant moves pixels between the original and sorted lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Every slot blends its original color toward its sorted color. Never collides.
    #[default]
    Blend,
    /// Pixels travel along `floor(lerp(i, target, progress))` over a blended backdrop.
    /// Mid-transition positions can collide or leave gaps.
    Travel,
}

/// Everything a single processing pass reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// The scalar used for both thresholding and ordering.
    pub criterion: Criterion,
    /// Pixels whose key is strictly above this are ON.
    pub threshold: Key,
    /// Optional upper bound of the ON band (inclusive).
    pub ceiling: Option<Key>,
    pub direction: Direction,
    pub order: SortOrder,
    /// ON runs no longer than this stay unsorted. 0 disables the cutoff.
    pub min_run_length: usize,
    pub interpolation: Interpolation,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            criterion: Criterion::Brightness,
            threshold: 0.0,
            ceiling: None,
            direction: Direction::Horizontal,
            order: SortOrder::Ascending,
            min_run_length: 0,
            interpolation: Interpolation::Blend,
        }
    }
}

impl Configuration {
    /// Parses a (possibly partial) JSON document over the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Configuration = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!("Loaded configuration from {}: {}", path.display(), config);
        Ok(config)
    }

    /// Pulls threshold and ceiling back into range after deserialization.
    fn normalize(&mut self) {
        self.threshold = self.criterion.clamp(self.threshold);
        self.ceiling = self.ceiling.map(|ceiling| self.criterion.clamp(ceiling));
    }

    /// The ON/OFF predicate shared by the segmenter and the mask renderer.
    #[inline]
    pub fn is_on(&self, key: Key) -> bool {
        key > self.threshold && self.ceiling.is_none_or(|ceiling| key <= ceiling)
    }

    /// Sets the threshold, clamped into the criterion's range.
    /// Returns `true` when the request had to be clamped.
    pub fn set_threshold(&mut self, requested: Key) -> bool {
        let clamped = self.criterion.clamp(requested);
        let was_clamped = clamped != requested;
        if was_clamped {
            warn!(
                "Threshold {} outside {} range {:?}; clamped to {}",
                requested,
                self.criterion,
                self.criterion.range(),
                clamped
            );
        }
        self.threshold = clamped;
        was_clamped
    }

    /// Moves the threshold by `steps` hundredths of the criterion's range.
    pub fn step_threshold(&mut self, steps: i32) {
        let step = self.criterion.max() / THRESHOLD_STEPS;
        self.threshold = self.criterion.clamp(self.threshold + step * steps as Key);
    }

    /// Switches criterion, carrying threshold and ceiling over proportionally.
    pub fn set_criterion(&mut self, criterion: Criterion) {
        if criterion == self.criterion {
            return;
        }
        let previous = self.criterion;
        self.threshold = previous.rescale(self.threshold, criterion);
        self.ceiling = self.ceiling.map(|ceiling| previous.rescale(ceiling, criterion));
        self.criterion = criterion;
        info!(
            "Criterion {} -> {}, threshold now {}",
            previous, criterion, self.threshold
        );
    }

    /// Threshold as a fraction of the criterion's range maximum.
    pub fn threshold_ratio(&self) -> Key {
        self.threshold / self.criterion.max()
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.set_criterion(criterion);
        self
    }

    pub fn with_threshold(mut self, threshold: Key) -> Self {
        self.set_threshold(threshold);
        self
    }

    pub fn with_ceiling(mut self, ceiling: Key) -> Self {
        self.ceiling = Some(self.criterion.clamp(ceiling));
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_min_run_length(mut self, min_run_length: usize) -> Self {
        self.min_run_length = min_run_length;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} > {:.3} ({:?}, {:?}, min run {})",
            self.criterion, self.threshold, self.direction, self.order, self.min_run_length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_clamped_not_wrapped() {
        let mut config = Configuration::default();
        assert!(config.set_threshold(400.0));
        assert_eq!(config.threshold, 255.0);
        assert!(config.set_threshold(-1.0));
        assert_eq!(config.threshold, 0.0);
        assert!(!config.set_threshold(128.0));
    }

    #[test]
    fn step_threshold_moves_by_one_percent_of_range() {
        let mut config = Configuration::default().with_criterion(Criterion::Hue);
        config.step_threshold(1);
        assert!((config.threshold - 3.6).abs() < 1e-4);
        config.step_threshold(-5);
        assert_eq!(config.threshold, 0.0);
    }

    #[test]
    fn selecting_hue_rescales_a_brightness_threshold() {
        let mut config = Configuration::default().with_threshold(130.0);
        config.set_criterion(Criterion::Hue);
        assert_eq!(config.criterion, Criterion::Hue);
        assert!((config.threshold - 130.0 / 255.0 * 360.0).abs() < 1e-3);
        assert!(config.threshold <= Criterion::Hue.max());

        config.set_criterion(Criterion::Saturation);
        assert!((config.threshold - 130.0 / 255.0).abs() < 1e-4);
    }

    #[test]
    fn predicate_is_strict_and_honors_ceiling() {
        let config = Configuration::default().with_threshold(100.0);
        assert!(!config.is_on(100.0));
        assert!(config.is_on(100.5));

        let banded = config.with_ceiling(190.0);
        assert!(banded.is_on(190.0));
        assert!(!banded.is_on(190.5));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = Configuration::from_json_str(
            r#"{ "criterion": "saturation", "threshold": 7.5, "order": "descending" }"#,
        )
        .expect("valid configuration");
        assert_eq!(config.criterion, Criterion::Saturation);
        assert_eq!(config.threshold, 1.0);
        assert_eq!(config.order, SortOrder::Descending);
        assert_eq!(config.direction, Direction::Horizontal);
        assert_eq!(config.min_run_length, 0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(Configuration::from_json_str("{ threshold: }").is_err());
    }
}
