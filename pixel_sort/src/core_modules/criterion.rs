// THEORY:
// The `Criterion` module is the scalar extractor. It picks which single-pixel
// heuristic acts as both the threshold key and the sort key for a pass. Keeping
// one enum for both roles guarantees that a pixel is classified and ordered by
// the same number.
//
// Each criterion owns its value range. The configuration layer uses the range to
// clamp thresholds and to rescale them when the criterion changes.

use crate::core_modules::pixel::pixel::Pixel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The scalar every threshold comparison and sort works on.
pub type Key = f32;

/// Which per-pixel scalar drives segmentation and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Rec. 709 luma, [0, 255].
    #[default]
    Brightness,
    /// HSV hue angle, [0, 360).
    Hue,
    /// HSV saturation, [0, 1].
    Saturation,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Brightness, Criterion::Hue, Criterion::Saturation];

    /// Computes this criterion's key for one pixel.
    #[inline]
    pub fn key(&self, pixel: &Pixel) -> Key {
        match self {
            Criterion::Brightness => pixel.brightness(),
            Criterion::Hue => pixel.hue(),
            Criterion::Saturation => pixel.saturation(),
        }
    }

    /// Inclusive (min, max) a threshold may take for this criterion.
    pub fn range(&self) -> (Key, Key) {
        match self {
            Criterion::Brightness => (0.0, 255.0),
            Criterion::Hue => (0.0, 360.0),
            Criterion::Saturation => (0.0, 1.0),
        }
    }

    pub fn max(&self) -> Key {
        self.range().1
    }

    pub fn clamp(&self, value: Key) -> Key {
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    /// Maps a value from this criterion's range onto `other`'s range.
    pub fn rescale(&self, value: Key, other: Criterion) -> Key {
        other.clamp(value / self.max() * other.max())
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Criterion::Brightness => "brightness",
            Criterion::Hue => "hue",
            Criterion::Saturation => "saturation",
        };
        f.write_str(name)
    }
}

/// Free-function form of [`Criterion::key`].
pub fn key(pixel: &Pixel, criterion: Criterion) -> Key {
    criterion.key(pixel)
}
