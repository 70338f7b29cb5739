use crate::alphabet::{Alphabet, NormalizedText, ALPHABET_LEN};

/// Count how many times each letter of the alphabet occurs.
///
/// Takes alphabet indices, panics on an index of [`ALPHABET_LEN`] or more.
pub fn count_letters(letters: impl IntoIterator<Item = u8>) -> [usize; ALPHABET_LEN] {
    let mut counts = [0; ALPHABET_LEN];
    for i in letters {
        counts[i as usize] += 1;
    }
    counts
}

/// Relative frequency of each letter in the normalised text, in alphabet order
/// ```
/// use kasiski::alphabet::Alphabet;
/// use kasiski::ioc::character_frequencies;
/// let alpha = Alphabet::russian();
/// let freqs = character_frequencies(&alpha, "ааб!");
/// assert_eq!(freqs[0], ('а', 2.0 / 3.0));
/// assert_eq!(freqs[1], ('б', 1.0 / 3.0));
/// ```
pub fn character_frequencies(alpha: &Alphabet, text: &str) -> Vec<(char, f64)> {
    let text = alpha.normalize(text);
    let counts = count_letters(text.indices().iter().copied());
    let total = text.len();

    alpha
        .letters()
        .iter()
        .zip(counts)
        .map(|(&c, n)| {
            // an empty text gets all zeros rather than NaN
            let freq = if total == 0 {
                0.0
            } else {
                n as f64 / total as f64
            };
            (c, freq)
        })
        .collect()
}

/// Index of coincidence of a single run of letters, 0 for fewer than two letters
pub fn index_of_coincidence(letters: impl IntoIterator<Item = u8>) -> f64 {
    let counts = count_letters(letters);
    let len: usize = counts.iter().sum();
    if len < 2 {
        return 0.0;
    }

    let pairs: usize = counts.iter().map(|&n| n * n.saturating_sub(1)).sum();
    pairs as f64 / (len * (len - 1)) as f64
}

/// Mean index of coincidence over the `key_len` interleaved columns of the text.
///
/// Columns of a text encrypted with a key of the right period are each a plain Caesar
/// shift, so they keep the uneven letter distribution of the language and score high.
/// https://en.wikipedia.org/wiki/Index_of_coincidence
pub fn average_index_of_coincidence(text: &NormalizedText, key_len: usize) -> f64 {
    if key_len == 0 {
        return 0.0;
    }

    let total: f64 = (0..key_len)
        .map(|offset| index_of_coincidence(text.column(offset, key_len)))
        .sum();
    total / key_len as f64
}
