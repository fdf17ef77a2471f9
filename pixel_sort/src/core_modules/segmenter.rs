// THEORY:
// The segmenter turns one line into an ordered list of runs. A run is a maximal
// stretch of consecutive pixels sharing the same ON/OFF classification, where ON
// means the criterion key passes the configuration's threshold predicate.
//
// Invariants the sorter relies on:
// - Runs partition the line: concatenating their pixels, in order, reproduces the
//   line exactly, and each `start_index` equals the sum of the previous lengths.
// - An ON run whose length is <= `min_run_length` is demoted to OFF. Its pixels stay
//   in place; it simply stops being eligible for sorting.
//
// Keys are computed once here and cached on the run, so the sorter never recomputes
// a heuristic for the same pixel.

use crate::config::Configuration;
use crate::core_modules::criterion::Key;
use crate::core_modules::pixel::pixel::Pixel;
use std::ops::Range;

/// ON/OFF classification of a pixel or run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mask {
    On,
    Off,
}

/// A contiguous piece of a line with a single classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub mask: Mask,
    /// Set when an ON run was too short to sort and was turned into OFF.
    pub demoted: bool,
    pub pixels: Vec<Pixel>,
    /// The criterion key of each pixel, parallel to `pixels`.
    pub keys: Vec<Key>,
    /// Position of `pixels[0]` within the parent line.
    pub start_index: usize,
}

impl Run {
    fn open(mask: Mask, start_index: usize) -> Self {
        Run {
            mask,
            demoted: false,
            pixels: Vec::new(),
            keys: Vec::new(),
            start_index,
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Line indices covered by this run.
    pub fn span(&self) -> Range<usize> {
        self.start_index..self.start_index + self.len()
    }

    pub fn is_sortable(&self) -> bool {
        self.mask == Mask::On
    }

    fn close(mut self, min_run_length: usize, runs: &mut Vec<Run>) {
        if self.mask == Mask::On && self.len() <= min_run_length {
            self.mask = Mask::Off;
            self.demoted = true;
        }
        runs.push(self);
    }
}

/// Classifies a single pixel under `config`.
#[inline]
pub fn classify(pixel: &Pixel, config: &Configuration) -> (Mask, Key) {
    let key = config.criterion.key(pixel);
    let mask = if config.is_on(key) { Mask::On } else { Mask::Off };
    (mask, key)
}

/// Splits `line` into runs covering `[0, line.len())` exactly once, in order.
pub fn segment(line: &[Pixel], config: &Configuration) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current: Option<Run> = None;

    for (index, pixel) in line.iter().enumerate() {
        let (mask, key) = classify(pixel, config);
        let run = match current.take() {
            Some(run) if run.mask == mask => run,
            Some(run) => {
                run.close(config.min_run_length, &mut runs);
                Run::open(mask, index)
            }
            None => Run::open(mask, index),
        };
        let run = current.insert(run);
        run.pixels.push(*pixel);
        run.keys.push(key);
    }

    if let Some(run) = current {
        run.close(config.min_run_length, &mut runs);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grays(levels: &[u8]) -> Vec<Pixel> {
        levels.iter().map(|level| Pixel::gray(*level)).collect()
    }

    fn masks(runs: &[Run]) -> Vec<(Mask, usize, usize)> {
        runs.iter().map(|r| (r.mask, r.start_index, r.len())).collect()
    }

    #[test]
    fn splits_on_classification_changes() {
        let config = Configuration::default().with_threshold(100.0);
        let runs = segment(&grays(&[10, 200, 220, 205, 10]), &config);
        assert_eq!(
            masks(&runs),
            vec![(Mask::Off, 0, 1), (Mask::On, 1, 3), (Mask::Off, 4, 1)]
        );
    }

    #[test]
    fn runs_partition_the_line() {
        let config = Configuration::default().with_threshold(60.0);
        let line = grays(&[0, 90, 90, 30, 200, 10, 10, 70, 255, 61]);
        let runs = segment(&line, &config);

        let rebuilt: Vec<Pixel> = runs.iter().flat_map(|r| r.pixels.clone()).collect();
        assert_eq!(rebuilt, line);

        let mut expected_start = 0;
        for run in &runs {
            assert_eq!(run.start_index, expected_start);
            assert_eq!(run.keys.len(), run.len());
            expected_start += run.len();
        }
    }

    #[test]
    fn uniform_lines_yield_one_run() {
        let config = Configuration::default().with_threshold(100.0);
        let off = segment(&grays(&[50; 8]), &config);
        assert_eq!(masks(&off), vec![(Mask::Off, 0, 8)]);

        let on = segment(&grays(&[150; 8]), &config);
        assert_eq!(masks(&on), vec![(Mask::On, 0, 8)]);
    }

    #[test]
    fn key_equal_to_threshold_is_off() {
        let pixel = Pixel::gray(128);
        let exact = Configuration::default().with_threshold(Pixel::gray(128).brightness());
        assert_eq!(classify(&pixel, &exact).0, Mask::Off);
    }

    #[test]
    fn short_on_runs_are_demoted_but_kept() {
        let config = Configuration::default()
            .with_threshold(100.0)
            .with_min_run_length(5);
        let line = grays(&[10, 200, 150, 180, 10, 200, 201, 202, 203, 204, 205]);
        let runs = segment(&line, &config);

        assert_eq!(
            masks(&runs),
            vec![
                (Mask::Off, 0, 1),
                (Mask::Off, 1, 3),
                (Mask::Off, 4, 1),
                (Mask::On, 5, 6)
            ]
        );
        assert!(runs[1].demoted);
        assert!(!runs[3].demoted);
        assert_eq!(runs.iter().map(Run::len).sum::<usize>(), line.len());
    }

    #[test]
    fn run_of_exactly_min_length_is_demoted() {
        let config = Configuration::default()
            .with_threshold(100.0)
            .with_min_run_length(3);
        let runs = segment(&grays(&[200, 200, 200]), &config);
        assert_eq!(masks(&runs), vec![(Mask::Off, 0, 3)]);
        assert!(runs[0].demoted);
    }

    #[test]
    fn empty_line_has_no_runs() {
        assert!(segment(&[], &Configuration::default()).is_empty());
    }
}
