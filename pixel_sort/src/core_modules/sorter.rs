// THEORY:
// The sorter reorders the pixels of every ON run by their cached criterion key and
// leaves OFF runs alone. It never moves a pixel across a run boundary, so the sorted
// line is a permutation *within* each ON run's index range.
//
// Rather than sorting pixels directly it sorts run-local indices. That permutation
// is what the animator needs: it tells us, for each original position, which slot
// the pixel lands in once sorting completes.

use crate::config::SortOrder;
use crate::core_modules::criterion::Key;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::segmenter::Run;
use std::cmp::Ordering;
use std::ops::Range;

/// A fully sorted line plus the bookkeeping needed to animate toward it.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedLine {
    pub pixels: Vec<Pixel>,
    /// `targets[i]` is the slot original pixel `i` occupies after sorting.
    pub targets: Vec<usize>,
    /// Line ranges that were actually sorted (ON runs).
    pub sorted_spans: Vec<Range<usize>>,
}

impl SortedLine {
    pub fn is_sorted_slot(&self, index: usize) -> bool {
        self.sorted_spans.iter().any(|span| span.contains(&index))
    }
}

fn compare(keys: &[Key], order: SortOrder) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |a, b| {
        let ascending = keys[*a].total_cmp(&keys[*b]);
        match order {
            SortOrder::Ascending => ascending,
            SortOrder::Descending => ascending.reverse(),
        }
    }
}

/// Run-local permutation: slot `k` of the sorted run takes `pixels[permutation[k]]`.
pub fn sort_permutation(run: &Run, order: SortOrder) -> Vec<usize> {
    let mut permutation: Vec<usize> = (0..run.len()).collect();
    if run.is_sortable() {
        permutation.sort_by(compare(&run.keys, order));
    }
    permutation
}

/// The run's pixels in output order. OFF runs come back unchanged.
pub fn sort_run(run: &Run, order: SortOrder) -> Vec<Pixel> {
    if !run.is_sortable() {
        return run.pixels.clone();
    }
    sort_permutation(run, order)
        .into_iter()
        .map(|index| run.pixels[index].opaque())
        .collect()
}

/// Sorts every ON run and concatenates all runs back into a full line.
pub fn sort_line(runs: &[Run], order: SortOrder) -> SortedLine {
    let length: usize = runs.iter().map(Run::len).sum();
    let mut pixels = Vec::with_capacity(length);
    let mut targets: Vec<usize> = (0..length).collect();
    let mut sorted_spans = Vec::new();

    for run in runs {
        if !run.is_sortable() {
            pixels.extend_from_slice(&run.pixels);
            continue;
        }
        for (slot, source) in sort_permutation(run, order).into_iter().enumerate() {
            pixels.push(run.pixels[source].opaque());
            targets[run.start_index + source] = run.start_index + slot;
        }
        sorted_spans.push(run.span());
    }

    SortedLine {
        pixels,
        targets,
        sorted_spans,
    }
}
