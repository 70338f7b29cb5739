use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kasiski::alphabet::Alphabet;
use kasiski::attack::*;
use kasiski::cipher::{decrypt_text, encrypt, Key};
use kasiski::ioc::average_index_of_coincidence;
use kasiski::key_length::score_candidates;
use kasiski::repeats::{find_repeats, DEFAULT_NGRAM_LENGTHS};
use kasiski::Error;

const SAMPLE: &str = include_str!("files/sample.txt");

fn attack_with_key(key: &str) -> Result<(Attack, Vec<Progress>)> {
    let alpha = Alphabet::russian();
    let enc = encrypt(&alpha, SAMPLE, key)?;

    let mut events = Vec::new();
    let attack = run_attack(&alpha, &enc.text, &AttackConfig::default(), |p| {
        events.push(p)
    })?;
    Ok((attack, events))
}

#[test]
fn recovers_five_letter_key() -> Result<()> {
    let (attack, events) = attack_with_key("тайна")?;
    assert_eq!(attack.key.as_str(), "тайна");
    assert!(!attack.swept);
    assert!(attack.candidates.contains(&5));

    assert_eq!(
        events.last(),
        Some(&Progress::Done {
            key: "тайна".to_string()
        })
    );

    Ok(())
}

#[test]
fn recovers_seven_letter_key() -> Result<()> {
    let (attack, _) = attack_with_key("загадка")?;
    assert_eq!(attack.key.as_str(), "загадка");
    assert_eq!(attack.key_len(), 7);

    Ok(())
}

#[test]
fn recovered_key_decrypts_sample() -> Result<()> {
    let alpha = Alphabet::russian();
    for key in ["ключ", "шифр", "космос"] {
        let enc = encrypt(&alpha, SAMPLE, key)?;
        let key = crack(&enc.text)?;
        let dec = decrypt_text(&alpha, &alpha.normalize(&enc.text), &key);
        assert_eq!(dec, alpha.normalize(SAMPLE), "key {key}");
    }

    Ok(())
}

#[test]
fn repeat_distances_favour_key_length() -> Result<()> {
    let alpha = Alphabet::russian();
    let enc = encrypt(&alpha, SAMPLE, "тайна")?;
    let repeats = find_repeats(&alpha.normalize(&enc.text), &DEFAULT_NGRAM_LENGTHS)?;

    let candidates = score_candidates(&repeats, 20, 0.5);
    let best = candidates
        .first()
        .ok_or_else(|| anyhow!("no key length candidates"))?;
    assert_eq!(*best, 5);

    Ok(())
}

#[test]
fn ioc_peaks_at_key_length() -> Result<()> {
    let alpha = Alphabet::russian();
    let plain = alpha.normalize(SAMPLE);
    let mut rng = StdRng::seed_from_u64(0x10c);

    for key_len in [5, 7] {
        for _ in 0..8 {
            let start = rng.gen_range(0..plain.len() - 1500);
            let window: String = plain.as_str().chars().skip(start).take(1500).collect();
            let key: Vec<u8> = (0..key_len).map(|_| rng.gen_range(0..32)).collect();
            let key = Key::from_indices(&alpha, key)?;

            let enc = encrypt(&alpha, &window, key.as_str())?;
            let text = alpha.normalize(&enc.text);
            let at_key = average_index_of_coincidence(&text, key_len);

            for other in (2..=20).filter(|len| len % key_len != 0) {
                let ioc = average_index_of_coincidence(&text, other);
                assert!(
                    at_key > ioc,
                    "key {key}: ioc {at_key} at {key_len} <= {ioc} at {other}"
                );
            }
        }
    }

    Ok(())
}

#[test]
fn empty_ciphertext_fails() {
    let mut events = Vec::new();
    let res = run_attack(
        &Alphabet::russian(),
        "1234 !?",
        &AttackConfig::default(),
        |p| events.push(p),
    );
    assert_eq!(res, Err(Error::EmptyInput));
    assert_eq!(events.last(), Some(&Progress::Failed(Error::EmptyInput)));
    assert_eq!(crack(""), Err(Error::EmptyInput));
}

#[test]
fn spawned_attack_matches_direct_run() -> Result<()> {
    let alpha = Alphabet::russian();
    let enc = encrypt(&alpha, SAMPLE, "тайна")?;

    let handle = spawn_attack(alpha, enc.text, AttackConfig::default());
    let letters = handle
        .progress()
        .filter(|p| matches!(p, Progress::KeyLetter { .. }))
        .count();
    let attack = handle.join()?;

    assert_eq!(attack.key.as_str(), "тайна");
    assert_eq!(letters, 5);

    Ok(())
}
