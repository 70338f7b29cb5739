use crate::alphabet::NormalizedText;
use crate::ioc::average_index_of_coincidence;
use crate::repeats::{distances, RepeatMap};
use std::ops::RangeInclusive;
use tracing::{debug, trace};

/// Longest key length considered
pub const DEFAULT_MAX_KEY_LEN: usize = 20;

/// Fraction of distances a candidate has to divide to be kept
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Shortest text the IOC sweep is attempted on
const MIN_SWEEP_TEXT_LEN: usize = 4;

/// Score every length in `2..=max_len` by the fraction of repeat distances it divides.
///
/// Returns the scores in ascending length order, or nothing if there are no distances.
pub fn divisor_scores(repeats: &RepeatMap, max_len: usize) -> Vec<(usize, f64)> {
    let distances = distances(repeats);
    if distances.is_empty() {
        return Vec::new();
    }

    let total = distances.len() as f64;
    (2..=max_len)
        .map(|candidate| {
            let divisible = distances.iter().filter(|&&d| d % candidate == 0).count();
            (candidate, divisible as f64 / total)
        })
        .collect()
}

/// Candidate key lengths scoring at least `threshold`, best first.
///
/// The sort is stable so equal scores stay in ascending length order.
/// ```
/// use kasiski::key_length::score_candidates;
/// use kasiski::repeats::RepeatMap;
/// let repeats = RepeatMap::from([("абв".to_string(), vec![6, 12, 18, 8])]);
/// assert_eq!(score_candidates(&repeats, 10, 0.5), [2, 3, 6, 4]);
/// ```
pub fn score_candidates(repeats: &RepeatMap, max_len: usize, threshold: f64) -> Vec<usize> {
    let mut scores: Vec<_> = divisor_scores(repeats, max_len)
        .into_iter()
        .filter(|&(_, score)| score >= threshold)
        .collect();
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    debug!(?scores, "key length candidates");

    scores.into_iter().map(|(len, _)| len).collect()
}

/// Pick the length with the highest average IOC, the first one wins ties
pub fn best_by_ioc(
    text: &NormalizedText,
    lengths: impl IntoIterator<Item = usize>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for len in lengths {
        let ioc = average_index_of_coincidence(text, len);
        trace!(len, ioc, "ioc trial");
        if best.map_or(true, |(_, best_ioc)| ioc > best_ioc) {
            best = Some((len, ioc));
        }
    }
    best
}

/// What the IOC sweep does when the repeats gave no candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepPlan {
    /// Text is too short to sweep at all, use a key length of 1
    TooShort,
    /// The sweep range is empty, use a key length of 1
    NoRange,
    /// Try every length in the range
    Sweep(RangeInclusive<usize>),
}

impl SweepPlan {
    /// Decide the sweep for a text of `text_len` letters
    /// ```
    /// use kasiski::key_length::SweepPlan;
    /// assert_eq!(SweepPlan::new(3, 20), SweepPlan::TooShort);
    /// assert_eq!(SweepPlan::new(5, 20), SweepPlan::NoRange);
    /// assert_eq!(SweepPlan::new(10, 20), SweepPlan::Sweep(2..=4));
    /// assert_eq!(SweepPlan::new(1000, 20), SweepPlan::Sweep(2..=20));
    /// ```
    pub fn new(text_len: usize, max_len: usize) -> Self {
        if text_len < MIN_SWEEP_TEXT_LEN {
            return SweepPlan::TooShort;
        }

        let max_try = max_len.min((text_len / 2).saturating_sub(1).max(1));
        if max_try < 2 {
            SweepPlan::NoRange
        } else {
            SweepPlan::Sweep(2..=max_try)
        }
    }
}
