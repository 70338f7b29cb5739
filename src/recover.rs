use crate::alphabet::{Alphabet, NormalizedText, ALPHABET_LEN};
use crate::cipher::Key;
use crate::error::{Error, Result};
use crate::ioc::count_letters;
use tracing::{debug, instrument};

/// Score decrypting one column with a single key letter.
///
/// `counts` holds how often each ciphertext letter occurs in the column; the score is
/// the dot product of the resulting plaintext letter counts with the reference
/// frequencies, so plaintext that looks like the language scores high.
pub fn score_shift(alpha: &Alphabet, counts: &[usize; ALPHABET_LEN], shift: u8) -> f64 {
    counts
        .iter()
        .enumerate()
        .map(|(c, &n)| n as f64 * alpha.freqs()[alpha.sub(c as u8, shift) as usize])
        .sum()
}

/// Break a single Caesar shifted column, returns the key letter index.
///
/// Candidates are scanned in alphabet order and only a strictly better score replaces
/// the current best, so the earliest letter wins ties.
pub fn break_column(alpha: &Alphabet, column: impl IntoIterator<Item = u8>) -> u8 {
    let counts = count_letters(column);

    let mut best_shift = 0;
    let mut best_score = f64::NEG_INFINITY;
    for shift in 0..alpha.num_chars() as u8 {
        let score = score_shift(alpha, &counts, shift);
        if score > best_score {
            best_score = score;
            best_shift = shift;
        }
    }

    best_shift
}

/// Recover a key of `key_len` letters, one column at a time.
///
/// `on_letter(position, key_len, partial_key)` is called after each letter is found.
/// Positions past the end of the text have an empty column and come out as "а".
#[instrument(skip(alpha, text, on_letter), fields(len = text.len()))]
pub fn recover_key(
    alpha: &Alphabet,
    text: &NormalizedText,
    key_len: usize,
    mut on_letter: impl FnMut(usize, usize, &str),
) -> Result<Key> {
    if text.is_empty() {
        return Err(Error::EmptyInput);
    }
    if key_len == 0 {
        return Err(Error::NoKeyLengthFound);
    }

    // columns past the end of the text are empty, only size for the ones that are not
    let letters = key_len.min(text.len());
    let mut indices = Vec::with_capacity(letters);
    let mut partial = String::with_capacity(letters * 2);
    for offset in 0..key_len {
        let shift = break_column(alpha, text.column(offset, key_len));
        indices.push(shift);
        partial.push(alpha.symbol_at(shift));
        debug!(offset, letter = %alpha.symbol_at(shift), "recovered key letter");
        on_letter(offset, key_len, &partial);
    }

    Key::from_indices(alpha, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{transform, Operation};

    const PLAIN: &str = "\
        Мороз и солнце день чудесный Еще ты дремлешь друг прелестный Пора красавица \
        проснись открой сомкнуты негой взоры навстречу северной авроры звездою севера явись";

    #[test]
    fn test_break_column_caesar() {
        let alpha = Alphabet::russian();
        let text = alpha.normalize(PLAIN);
        for shift in [0, 1, 13, 31] {
            let shifted = text.indices().iter().map(|&p| alpha.add(p, shift));
            assert_eq!(break_column(&alpha, shifted), shift);
        }
    }

    #[test]
    fn test_break_column_ties_take_first() {
        let alpha = Alphabet::russian();
        // nothing to score, every shift gives 0
        assert_eq!(break_column(&alpha, Vec::new()), 0);
    }

    #[test]
    fn test_score_shift() {
        let alpha = Alphabet::russian();
        let mut counts = [0; ALPHABET_LEN];
        // two "б" decrypted with "а" are two "б"
        counts[1] = 2;
        assert_eq!(score_shift(&alpha, &counts, 0), 2.0 * alpha.freqs()[1]);
        // decrypted with "б" they become "а"
        assert_eq!(score_shift(&alpha, &counts, 1), 2.0 * alpha.freqs()[0]);
    }

    #[test]
    fn test_recover_key_reports_every_letter() {
        let alpha = Alphabet::russian();
        let text = alpha.normalize(PLAIN);
        let mut seen = Vec::new();
        let key = recover_key(&alpha, &text, 3, |pos, total, partial: &str| {
            seen.push((pos, total, partial.chars().count()));
        })
        .unwrap();

        assert_eq!(key.len(), 3);
        assert_eq!(seen, [(0, 3, 1), (1, 3, 2), (2, 3, 3)]);
    }

    #[test]
    fn test_recover_key_single_letter() {
        let alpha = Alphabet::russian();
        let text = alpha.normalize(PLAIN);
        let key = Key::parse(&alpha, "г").unwrap();
        let enc = transform(&alpha, &text, &key, Operation::Encrypt);
        let ct = alpha.normalize(&enc.text);
        let found = recover_key(&alpha, &ct, 1, |_, _, _| ()).unwrap();
        assert_eq!(found, key);
    }

    #[test]
    fn test_recover_key_longer_than_text() {
        let alpha = Alphabet::russian();
        let text = alpha.normalize("приветмир");
        let mut calls = 0;
        let key = recover_key(&alpha, &text, 12, |_, _, _| calls += 1).unwrap();
        assert_eq!(key.len(), 12);
        assert_eq!(calls, 12);
        assert!(key.as_str().ends_with("ааа"));
    }

    #[test]
    fn test_recover_key_errors() {
        let alpha = Alphabet::russian();
        let empty = alpha.normalize("");
        assert_eq!(recover_key(&alpha, &empty, 3, |_, _, _| ()), Err(Error::EmptyInput));
        let text = alpha.normalize(PLAIN);
        assert_eq!(recover_key(&alpha, &text, 0, |_, _, _| ()), Err(Error::NoKeyLengthFound));
    }
}
