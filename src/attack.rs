use crate::alphabet::Alphabet;
use crate::cipher::Key;
use crate::error::{Error, Result};
use crate::key_length::{
    best_by_ioc, score_candidates, SweepPlan, DEFAULT_MAX_KEY_LEN, DEFAULT_THRESHOLD,
};
use crate::recover::recover_key;
use crate::repeats::{find_repeats, DEFAULT_NGRAM_LENGTHS};
use std::fmt;
use std::str::Utf8Error;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Placeholder for key letters not recovered yet
const PENDING_LETTER: char = '○';

/// Tunables for [`run_attack`]
#[derive(Debug, Clone, PartialEq)]
pub struct AttackConfig {
    /// n-gram lengths searched for repeats
    pub ngram_lengths: Vec<usize>,
    /// longest key length considered
    pub max_key_len: usize,
    /// fraction of repeat distances a key length has to divide
    pub threshold: f64,
    /// pause after every progress event, zero disables it
    pub step_delay: Duration,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            ngram_lengths: DEFAULT_NGRAM_LENGTHS.to_vec(),
            max_key_len: DEFAULT_MAX_KEY_LEN,
            threshold: DEFAULT_THRESHOLD,
            step_delay: Duration::ZERO,
        }
    }
}

/// The stages of an attack, in the order they run
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Preprocessing,
    RepeatSearch,
    KeyLengthCandidates,
    KeyLengthRefinement,
    KeyRecovery,
    Done,
    Failed,
}

/// A milestone reported while an attack runs
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Preprocessing,
    SearchingRepeats { lengths: Vec<usize> },
    ScoringCandidates,
    RefiningCandidates { count: usize },
    CheckingCandidate { index: usize, count: usize, len: usize },
    NoCandidates { max_len: usize },
    TooShort,
    NoSweepRange,
    SweepTrial { len: usize, trial: usize, trials: usize },
    KeyLengthChosen { len: usize },
    RecoveringKey,
    KeyLetter { position: usize, total: usize, partial: String },
    Done { key: String },
    Failed(Error),
}

impl Progress {
    pub fn stage(&self) -> Stage {
        match self {
            Progress::Preprocessing => Stage::Preprocessing,
            Progress::SearchingRepeats { .. } => Stage::RepeatSearch,
            Progress::ScoringCandidates => Stage::KeyLengthCandidates,
            Progress::RefiningCandidates { .. }
            | Progress::CheckingCandidate { .. }
            | Progress::NoCandidates { .. }
            | Progress::TooShort
            | Progress::NoSweepRange
            | Progress::SweepTrial { .. }
            | Progress::KeyLengthChosen { .. } => Stage::KeyLengthRefinement,
            Progress::RecoveringKey | Progress::KeyLetter { .. } => Stage::KeyRecovery,
            Progress::Done { .. } => Stage::Done,
            Progress::Failed(_) => Stage::Failed,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Preprocessing => write!(f, "Step 1/4: preprocessing text..."),
            Progress::SearchingRepeats { lengths } => {
                let lengths: Vec<_> = lengths.iter().map(usize::to_string).collect();
                write!(
                    f,
                    "Step 2/4: searching for repeated n-grams ({} letters)...",
                    lengths.join(",")
                )
            }
            Progress::ScoringCandidates => {
                write!(f, "Step 3/4: estimating possible key lengths...")
            }
            Progress::RefiningCandidates { count } => write!(
                f,
                "Step 3.1/4: found {count} key length candidate(s), refining by index of coincidence..."
            ),
            Progress::CheckingCandidate { index, count, len } => write!(
                f,
                "Step 3.1.{index}/4: checking length {len} (candidate {index}/{count})..."
            ),
            Progress::NoCandidates { max_len } => write!(
                f,
                "Step 3.1/4: no candidates from n-grams, sweeping lengths 2-{max_len} by index of coincidence..."
            ),
            Progress::TooShort => write!(
                f,
                "Text is too short to sweep key lengths by index of coincidence, trying length 1."
            ),
            Progress::NoSweepRange => write!(
                f,
                "Could not find a range of key lengths to sweep, trying length 1."
            ),
            Progress::SweepTrial { len, trial, trials } => write!(
                f,
                "Step 3.1.{trial}/4: checking length {len} (sweep {trial}/{trials})..."
            ),
            Progress::KeyLengthChosen { len } => {
                write!(f, "Step 3.2/4: chosen key length: {len}.")
            }
            Progress::RecoveringKey => write!(f, "Step 4/4: recovering key letters..."),
            Progress::KeyLetter {
                position,
                total,
                partial,
            } => {
                let pending = total.saturating_sub(partial.chars().count());
                write!(
                    f,
                    "Step 4/4: recovering key letters ({}/{total}): {partial}",
                    position + 1
                )?;
                for _ in 0..pending {
                    write!(f, "{PENDING_LETTER}")?;
                }
                Ok(())
            }
            Progress::Done { key } => write!(f, "Attack finished, found key: {key}"),
            Progress::Failed(e) => write!(f, "Error: {e}."),
        }
    }
}

/// What a successful attack found
#[derive(Debug, Clone, PartialEq)]
pub struct Attack {
    pub key: Key,
    /// divisor scoring candidates, best first
    pub candidates: Vec<usize>,
    /// whether the key length came from the IOC sweep
    pub swept: bool,
}

impl Attack {
    pub fn key_len(&self) -> usize {
        self.key.len()
    }
}

/// Hands progress to the caller and optionally pauses after each event
struct Reporter<F> {
    on_progress: F,
    delay: Duration,
}

impl<F: FnMut(Progress)> Reporter<F> {
    fn report(&mut self, progress: Progress) {
        info!(stage = ?progress.stage(), "{progress}");
        (self.on_progress)(progress);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn fail(&mut self, e: Error) -> Error {
        self.report(Progress::Failed(e.clone()));
        e
    }
}

/// Recover the key of a Vigenère ciphertext.
///
/// Repeated n-grams give candidate key lengths, the index of coincidence picks between
/// them (or sweeps every length when there were none), then each key letter is found by
/// frequency analysis of its column. Every milestone is passed to `on_progress` in order.
pub fn run_attack(
    alpha: &Alphabet,
    raw: &str,
    config: &AttackConfig,
    on_progress: impl FnMut(Progress),
) -> Result<Attack> {
    attack(alpha, Ok(raw), config, on_progress)
}

/// Run the attack on raw bytes, which have to be UTF-8 text.
///
/// Bytes that are not text fail with [`Error::InvalidInput`] during preprocessing.
pub fn run_attack_bytes(
    alpha: &Alphabet,
    raw: &[u8],
    config: &AttackConfig,
    on_progress: impl FnMut(Progress),
) -> Result<Attack> {
    attack(alpha, std::str::from_utf8(raw), config, on_progress)
}

#[instrument(skip_all)]
fn attack(
    alpha: &Alphabet,
    raw: std::result::Result<&str, Utf8Error>,
    config: &AttackConfig,
    on_progress: impl FnMut(Progress),
) -> Result<Attack> {
    let mut reporter = Reporter {
        on_progress,
        delay: config.step_delay,
    };

    reporter.report(Progress::Preprocessing);
    let raw = match raw {
        Ok(raw) => raw,
        Err(e) => {
            error!(%e, "attack input is not text");
            return Err(reporter.fail(Error::from(e)));
        }
    };
    let text = alpha.normalize(raw);
    debug!(raw = raw.len(), letters = text.len(), "normalised input");
    if text.is_empty() {
        return Err(reporter.fail(Error::EmptyInput));
    }

    reporter.report(Progress::SearchingRepeats {
        lengths: config.ngram_lengths.clone(),
    });
    let repeats = match find_repeats(&text, &config.ngram_lengths) {
        Ok(repeats) => repeats,
        Err(e) => return Err(reporter.fail(e)),
    };

    reporter.report(Progress::ScoringCandidates);
    let candidates = score_candidates(&repeats, config.max_key_len, config.threshold);

    let swept = candidates.is_empty();
    let chosen = if !swept {
        let count = candidates.len();
        reporter.report(Progress::RefiningCandidates { count });
        let trials = candidates.iter().enumerate().map(|(i, &len)| {
            reporter.report(Progress::CheckingCandidate {
                index: i + 1,
                count,
                len,
            });
            len
        });
        best_by_ioc(&text, trials).map(|(len, _)| len)
    } else {
        reporter.report(Progress::NoCandidates {
            max_len: config.max_key_len,
        });
        match SweepPlan::new(text.len(), config.max_key_len) {
            SweepPlan::TooShort => {
                reporter.report(Progress::TooShort);
                Some(1)
            }
            SweepPlan::NoRange => {
                reporter.report(Progress::NoSweepRange);
                Some(1)
            }
            SweepPlan::Sweep(range) => {
                let trials = range.clone().count();
                let lengths = range.enumerate().map(|(i, len)| {
                    reporter.report(Progress::SweepTrial {
                        len,
                        trial: i + 1,
                        trials,
                    });
                    len
                });
                best_by_ioc(&text, lengths).map(|(len, _)| len)
            }
        }
    };

    let Some(key_len) = chosen else {
        return Err(reporter.fail(Error::NoKeyLengthFound));
    };
    reporter.report(Progress::KeyLengthChosen { len: key_len });

    reporter.report(Progress::RecoveringKey);
    let recovered = recover_key(alpha, &text, key_len, |position, total, partial| {
        reporter.report(Progress::KeyLetter {
            position,
            total,
            partial: partial.to_string(),
        })
    });
    let key = match recovered {
        Ok(key) => key,
        Err(e) => return Err(reporter.fail(e)),
    };

    reporter.report(Progress::Done {
        key: key.to_string(),
    });

    Ok(Attack {
        key,
        candidates,
        swept,
    })
}

/// Recover the key with the default alphabet and configuration
/// ```
/// use kasiski::attack::crack;
/// // "я" decrypts to the most common letter "о" under "с"
/// assert_eq!(crack("яяя").unwrap().as_str(), "с");
/// ```
pub fn crack(raw: &str) -> Result<Key> {
    let attack = run_attack(&Alphabet::russian(), raw, &AttackConfig::default(), |_| ())?;
    Ok(attack.key)
}

/// An attack running on its own thread
pub struct AttackHandle {
    progress: mpsc::Receiver<Progress>,
    handle: thread::JoinHandle<Result<Attack>>,
}

impl AttackHandle {
    /// Block on progress events until the attack finishes
    pub fn progress(&self) -> mpsc::Iter<'_, Progress> {
        self.progress.iter()
    }

    /// Wait for the attack to finish, re-raising a panic from the worker
    pub fn join(self) -> Result<Attack> {
        self.handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    }
}

/// Start an attack on a worker thread, streaming progress over a channel.
///
/// There is no cancellation; dropping the handle leaves the worker to finish on its own.
pub fn spawn_attack(alpha: Alphabet, raw: String, config: AttackConfig) -> AttackHandle {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        run_attack(&alpha, &raw, &config, |progress| {
            // the receiver may be gone, the attack still runs to the end
            let _ = tx.send(progress);
        })
    });

    AttackHandle {
        progress: rx,
        handle,
    }
}
