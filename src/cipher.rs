use crate::alphabet::{Alphabet, NormalizedText};
use crate::error::{Error, Result};
use std::fmt;
use tracing::debug;

/// Number of letters per group in the cipher output
pub const GROUP_SIZE: usize = 5;

/// A non-empty key made of alphabet letters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(NormalizedText);

impl Key {
    /// Normalise a raw key, failing if no letters remain
    /// ```
    /// use kasiski::alphabet::Alphabet;
    /// use kasiski::cipher::Key;
    /// let alpha = Alphabet::russian();
    /// assert_eq!(Key::parse(&alpha, "Ключ 1").unwrap().as_str(), "ключ");
    /// assert!(Key::parse(&alpha, "key").is_err());
    /// ```
    pub fn parse(alpha: &Alphabet, raw: &str) -> Result<Self> {
        let key = alpha.normalize(raw);
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        Ok(Self(key))
    }

    pub fn from_indices(alpha: &Alphabet, indices: Vec<u8>) -> Result<Self> {
        if indices.is_empty() {
            return Err(Error::EmptyKey);
        }
        Ok(Self(NormalizedText::from_indices(alpha, indices)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[u8] {
        self.0.indices()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl Operation {
    fn apply(self, alpha: &Alphabet, p: u8, k: u8) -> u8 {
        match self {
            Operation::Encrypt => alpha.add(p, k),
            Operation::Decrypt => alpha.sub(p, k),
        }
    }

    fn formula(self, n: usize, p: u8, k: u8, c: u8) -> String {
        match self {
            Operation::Encrypt => format!("({p} + {k}) % {n} = {c}"),
            Operation::Decrypt => format!("({p} - {k} + {n}) % {n} = {c}"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encrypt => write!(f, "encrypt"),
            Operation::Decrypt => write!(f, "decrypt"),
        }
    }
}

/// One letter of a cipher run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// 1-based position in the normalised input
    pub step: usize,
    pub input: char,
    pub input_index: u8,
    pub key: char,
    pub key_index: u8,
    pub output: char,
    pub output_index: u8,
    pub operation: Operation,
    /// The arithmetic that produced the output, e.g. `(15 + 10) % 32 = 25`
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherResult {
    /// Output letters grouped by [`GROUP_SIZE`]
    pub text: String,
    pub trace: Vec<TraceEntry>,
}

impl CipherResult {
    /// The output with the group separators removed
    pub fn ungrouped(&self) -> String {
        self.text.chars().filter(|c| *c != ' ').collect()
    }
}

/// Separate the text into groups of five letters.
///
/// A space only goes in front of a letter, never at the end.
/// ```
/// use kasiski::cipher::group_by_five;
/// assert_eq!(group_by_five("абвгдежзи"), "абвгд ежзи");
/// assert_eq!(group_by_five("абвгд"), "абвгд");
/// ```
pub fn group_by_five(text: &str) -> String {
    let mut grouped = String::with_capacity(text.len() + text.len() / GROUP_SIZE);
    for (i, c) in text.chars().enumerate() {
        if i > 0 && i % GROUP_SIZE == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped
}

/// Run the key over already normalised text, recording every step
pub fn transform(
    alpha: &Alphabet,
    text: &NormalizedText,
    key: &Key,
    operation: Operation,
) -> CipherResult {
    let n = alpha.num_chars();
    let mut out = String::with_capacity(text.as_str().len());
    let mut trace = Vec::with_capacity(text.len());

    for (i, (&p, &k)) in text
        .indices()
        .iter()
        .zip(key.indices().iter().cycle())
        .enumerate()
    {
        let c = operation.apply(alpha, p, k);
        let output = alpha.symbol_at(c);
        out.push(output);

        trace.push(TraceEntry {
            step: i + 1,
            input: alpha.symbol_at(p),
            input_index: p,
            key: alpha.symbol_at(k),
            key_index: k,
            output,
            output_index: c,
            operation,
            formula: operation.formula(n, p, k, c),
        });
    }

    debug!(%operation, len = text.len(), key_len = key.len(), "cipher run");

    CipherResult {
        text: group_by_five(&out),
        trace,
    }
}

/// Decrypt normalised text without building a trace
pub fn decrypt_text(alpha: &Alphabet, text: &NormalizedText, key: &Key) -> NormalizedText {
    let indices = text
        .indices()
        .iter()
        .zip(key.indices().iter().cycle())
        .map(|(&c, &k)| alpha.sub(c, k))
        .collect();
    NormalizedText::from_indices(alpha, indices)
}

fn run(
    alpha: &Alphabet,
    raw_text: &str,
    raw_key: &str,
    operation: Operation,
) -> Result<CipherResult> {
    let text = alpha.normalize(raw_text);
    if text.is_empty() {
        return Err(Error::EmptyInput);
    }
    let key = Key::parse(alpha, raw_key)?;

    Ok(transform(alpha, &text, &key, operation))
}

/// Encrypt a raw plaintext with a raw key
/// ```
/// use kasiski::alphabet::Alphabet;
/// use kasiski::cipher::encrypt;
/// let alpha = Alphabet::russian();
/// assert_eq!(encrypt(&alpha, "ааааааа", "б").unwrap().text, "ббббб бб");
/// ```
pub fn encrypt(alpha: &Alphabet, plain: &str, key: &str) -> Result<CipherResult> {
    run(alpha, plain, key, Operation::Encrypt)
}

/// Decrypt a raw ciphertext with a raw key
pub fn decrypt(alpha: &Alphabet, cipher: &str, key: &str) -> Result<CipherResult> {
    run(alpha, cipher, key, Operation::Decrypt)
}
