//! Breaking the Vigenère cipher over the 32 letter Russian alphabet.
//!
//! Repeated n-grams in the ciphertext (Kasiski examination) suggest key lengths, the index
//! of coincidence picks the most likely one, and each key letter is then recovered by
//! frequency analysis of its column.
//!
//! ```
//! use kasiski::alphabet::Alphabet;
//! use kasiski::cipher::{decrypt, encrypt};
//!
//! let alpha = Alphabet::russian();
//! let enc = encrypt(&alpha, "привет мир", "ключ").unwrap();
//! assert_eq!(decrypt(&alpha, &enc.text, "ключ").unwrap().ungrouped(), "приветмир");
//! ```

pub mod alphabet;
pub mod attack;
pub mod cipher;
pub mod error;
pub mod ioc;
pub mod key_length;
pub mod recover;
pub mod repeats;

pub use error::{Error, Result};
