use std::str::Utf8Error;

/// Errors produced by the cipher and the attack pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The text has no alphabet characters once normalised
    EmptyInput,
    /// The key has no alphabet characters once normalised
    EmptyKey,
    /// The raw input was not text at all
    InvalidInput(Utf8Error),
    /// Neither divisor scoring nor the IOC sweep could pick a key length
    NoKeyLengthFound,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "text is empty or contains no letters а-я"),
            Error::EmptyKey => write!(f, "key is empty or contains no letters а-я"),
            Error::InvalidInput(e) => write!(f, "input is not valid UTF-8 text: {e}"),
            Error::NoKeyLengthFound => {
                write!(f, "could not determine the key length, try a longer text")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidInput(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Utf8Error> for Error {
    fn from(value: Utf8Error) -> Self {
        Self::InvalidInput(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
