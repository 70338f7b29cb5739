use crate::alphabet::NormalizedText;
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// The n-gram lengths searched for by default
pub const DEFAULT_NGRAM_LENGTHS: [usize; 3] = [3, 4, 5];

/// Repeated substring -> distance between every pair of its occurrences
pub type RepeatMap = HashMap<String, Vec<usize>>;

/// Find every substring of the given lengths that occurs more than once.
///
/// For each repeated substring the distance between every unordered pair of its
/// starting positions is recorded, ordered by first then second position.
/// Lengths that are zero or longer than the text are skipped.
/// ```
/// use kasiski::alphabet::Alphabet;
/// use kasiski::repeats::find_repeats;
/// let text = Alphabet::russian().normalize("абабаб");
/// let repeats = find_repeats(&text, &[3]).unwrap();
/// assert_eq!(repeats["аба"], [2]);
/// assert_eq!(repeats["баб"], [2]);
/// ```
#[instrument(skip_all, fields(len = text.len(), lengths = ?lengths))]
pub fn find_repeats(text: &NormalizedText, lengths: &[usize]) -> Result<RepeatMap> {
    if text.is_empty() {
        return Err(Error::EmptyInput);
    }

    let symbols: Vec<char> = text.as_str().chars().collect();
    let mut repeats = RepeatMap::new();

    for &len in lengths {
        if len == 0 || len > text.len() {
            continue;
        }

        let mut positions: HashMap<&[u8], Vec<usize>> = HashMap::new();
        for (i, window) in text.indices().windows(len).enumerate() {
            positions.entry(window).or_default().push(i);
        }

        for pos in positions.into_values().filter(|pos| pos.len() >= 2) {
            let gram: String = symbols[pos[0]..pos[0] + len].iter().collect();
            let distances = repeats.entry(gram).or_default();
            for (i, first) in pos.iter().enumerate() {
                distances.extend(pos[i + 1..].iter().map(|second| second - first));
            }
        }
    }

    debug!(repeated = repeats.len(), "n-gram search done");

    Ok(repeats)
}

/// Every distance recorded in the map, as one multiset
pub fn distances(repeats: &RepeatMap) -> Vec<usize> {
    repeats.values().flatten().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    #[test]
    fn test_find_repeats_ababab() {
        let text = Alphabet::russian().normalize("абабаб");
        let repeats = find_repeats(&text, &[3]).unwrap();
        assert_eq!(repeats.len(), 2);
        assert_eq!(repeats["аба"], [2]);
        assert_eq!(repeats["баб"], [2]);
    }

    #[test]
    fn test_find_repeats_all_pairs() {
        // "абв" at 0, 4 and 8
        let text = Alphabet::russian().normalize("абвгабвдабв");
        let repeats = find_repeats(&text, &[3]).unwrap();
        assert_eq!(repeats["абв"], [4, 8, 4]);
        assert!(!repeats.contains_key("бвг"));
    }

    #[test]
    fn test_find_repeats_merges_lengths() {
        let text = Alphabet::russian().normalize("абвгдабвгд");
        let repeats = find_repeats(&text, &DEFAULT_NGRAM_LENGTHS).unwrap();
        assert_eq!(repeats["абв"], [5]);
        assert_eq!(repeats["абвг"], [5]);
        assert_eq!(repeats["абвгд"], [5]);
        // three trigrams, two 4-grams and one 5-gram
        assert_eq!(repeats.len(), 6);
        assert!(distances(&repeats).iter().all(|&d| d == 5));
    }

    #[test]
    fn test_find_repeats_skips_long_lengths() {
        let text = Alphabet::russian().normalize("аааа");
        let repeats = find_repeats(&text, &[0, 3, 5, 9]).unwrap();
        assert_eq!(repeats.len(), 1);
        assert_eq!(repeats["ааа"], [1]);
    }

    #[test]
    fn test_find_repeats_no_repeats() {
        let text = Alphabet::russian().normalize("абвгдежз");
        assert!(find_repeats(&text, &DEFAULT_NGRAM_LENGTHS)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_repeats_empty_fails() {
        let text = Alphabet::russian().normalize("hello");
        assert_eq!(find_repeats(&text, &[3]), Err(Error::EmptyInput));
    }
}
