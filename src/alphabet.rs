use std::fmt;

/// Number of letters in the alphabet
pub const ALPHABET_LEN: usize = 32;

/// The Russian alphabet without ё, in code point order
const RUSSIAN_LETTERS: [char; ALPHABET_LEN] = [
    'а', 'б', 'в', 'г', 'д', 'е', 'ж', 'з', 'и', 'й', 'к', 'л', 'м', 'н', 'о', 'п', 'р', 'с',
    'т', 'у', 'ф', 'х', 'ц', 'ч', 'ш', 'щ', 'ъ', 'ы', 'ь', 'э', 'ю', 'я',
];

/// Letter frequencies (percent) for а-я in order
const RUSSIAN_FREQ: [f64; ALPHABET_LEN] = [
    6.2, 1.4, 3.8, 1.3, 2.5, 7.2, 0.7, 1.6, 6.2, 1.0, 2.8, 3.5, 2.6, 5.3, 9.0, 2.3, 4.0, 4.5, 5.3,
    2.1, 0.2, 0.9, 0.3, 1.2, 0.6, 0.3, 1.4, 1.6, 1.4, 0.3, 0.6, 1.8,
];

/// The letter folded into its base letter during normalisation
const FOLDED: (char, char) = ('ё', 'е');

/// A fixed, ordered alphabet together with its reference letter frequencies.
///
/// Built once and handed to every component by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Alphabet {
    letters: [char; ALPHABET_LEN],
    freqs: [f64; ALPHABET_LEN],
}

impl Alphabet {
    /// The 32 letter Russian alphabet with frequencies normalised to sum to 1
    pub fn russian() -> Self {
        let total: f64 = RUSSIAN_FREQ.iter().sum();
        Self {
            letters: RUSSIAN_LETTERS,
            freqs: RUSSIAN_FREQ.map(|f| f / total),
        }
    }

    /// Return the number of characters in the alphabet
    pub fn num_chars(&self) -> usize {
        self.letters.len()
    }

    pub fn letters(&self) -> &[char; ALPHABET_LEN] {
        &self.letters
    }

    /// Return the reference frequency of each letter, in alphabet order
    pub fn freqs(&self) -> &[f64; ALPHABET_LEN] {
        &self.freqs
    }

    /// Return the index of a letter, or None if it is not in the alphabet
    /// ```
    /// use kasiski::alphabet::Alphabet;
    /// let alpha = Alphabet::russian();
    /// assert_eq!(alpha.index_of('а'), Some(0));
    /// assert_eq!(alpha.index_of('я'), Some(31));
    /// assert_eq!(alpha.index_of('ё'), None);
    /// ```
    pub fn index_of(&self, c: char) -> Option<u8> {
        self.letters.binary_search(&c).ok().map(|i| i as u8)
    }

    /// Return the letter at an index, panics if the index is out of range
    pub fn symbol_at(&self, index: u8) -> char {
        self.letters[index as usize]
    }

    /// (a + b) mod N
    pub fn add(&self, a: u8, b: u8) -> u8 {
        ((a as usize + b as usize) % self.num_chars()) as u8
    }

    /// (a - b + N) mod N
    pub fn sub(&self, a: u8, b: u8) -> u8 {
        let n = self.num_chars();
        ((a as usize + n - b as usize) % n) as u8
    }

    /// Normalise arbitrary text down to the alphabet.
    ///
    /// Text is lowercased, ё becomes е and everything else that is not a letter of the
    /// alphabet (whitespace, punctuation, digits, latin letters) is dropped.
    /// ```
    /// use kasiski::alphabet::Alphabet;
    /// let alpha = Alphabet::russian();
    /// assert_eq!(alpha.normalize("Ёлка, 2 шт.!").as_str(), "елкашт");
    /// ```
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let indices = text
            .chars()
            .flat_map(char::to_lowercase)
            .map(|c| if c == FOLDED.0 { FOLDED.1 } else { c })
            .filter_map(|c| self.index_of(c))
            .collect();

        NormalizedText::from_indices(self, indices)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::russian()
    }
}

/// Text made only of alphabet letters, kept both as indices and as a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedText {
    indices: Vec<u8>,
    text: String,
}

impl NormalizedText {
    /// Build from alphabet indices, panics if any index is out of range
    pub fn from_indices(alpha: &Alphabet, indices: Vec<u8>) -> Self {
        let text = indices.iter().map(|&i| alpha.symbol_at(i)).collect();
        Self { indices, text }
    }

    /// Number of letters in the text
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Every `period`-th letter starting at `offset`, panics if `period` is 0
    /// ```
    /// use kasiski::alphabet::Alphabet;
    /// let text = Alphabet::russian().normalize("абвгде");
    /// assert_eq!(text.column(1, 2).collect::<Vec<_>>(), [1, 3, 5]);
    /// ```
    pub fn column(&self, offset: usize, period: usize) -> impl Iterator<Item = u8> + '_ {
        self.indices.iter().skip(offset).step_by(period).copied()
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
