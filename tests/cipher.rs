use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kasiski::alphabet::Alphabet;
use kasiski::cipher::*;
use kasiski::ioc::character_frequencies;
use kasiski::Error;

const SAMPLE: &str = include_str!("files/sample.txt");

fn random_key(rng: &mut StdRng, alpha: &Alphabet, len: usize) -> String {
    (0..len)
        .map(|_| alpha.symbol_at(rng.gen_range(0..alpha.num_chars() as u8)))
        .collect()
}

#[test]
fn privet_mir_round_trip() -> Result<()> {
    let alpha = Alphabet::russian();

    let enc = encrypt(&alpha, "привет мир", "ключ")?;
    let dec = decrypt(&alpha, &enc.text, "ключ")?;
    assert_eq!(dec.ungrouped(), "приветмир");

    assert_eq!(encrypt(&alpha, "", "ключ"), Err(Error::EmptyInput));
    assert_eq!(encrypt(&alpha, "привет", ""), Err(Error::EmptyKey));

    Ok(())
}

#[test]
fn round_trip_random_keys() -> Result<()> {
    let alpha = Alphabet::russian();
    let mut rng = StdRng::seed_from_u64(32);
    let plain = alpha.normalize(SAMPLE);

    for len in 1..=12 {
        let key = random_key(&mut rng, &alpha, len);
        let enc = encrypt(&alpha, SAMPLE, &key)?;
        let dec = decrypt(&alpha, &enc.ungrouped(), &key)?;
        assert_eq!(dec.ungrouped(), plain.as_str(), "key {key:?}");
    }

    Ok(())
}

#[test]
fn output_stays_in_alphabet() -> Result<()> {
    let alpha = Alphabet::russian();
    let enc = encrypt(&alpha, SAMPLE, "Шифровальщик!")?;
    let dec = decrypt(&alpha, SAMPLE, "ЯЁЖ")?;

    for res in [&enc, &dec] {
        assert!(res.ungrouped().chars().all(|c| alpha.index_of(c).is_some()));
        assert!(res
            .trace
            .iter()
            .all(|step| alpha.letters().contains(&step.output)));
    }

    Ok(())
}

#[test]
fn grouping_and_trace_line_up() -> Result<()> {
    let alpha = Alphabet::russian();
    let enc = encrypt(&alpha, "абвгдежзи", "а")?;
    assert_eq!(enc.text, "абвгд ежзи");
    assert_eq!(enc.trace.len(), 9);

    let steps: Vec<_> = enc.trace.iter().map(|step| step.step).collect();
    assert_eq!(steps, (1..=9).collect::<Vec<_>>());
    assert!(enc
        .trace
        .iter()
        .all(|step| step.operation == Operation::Encrypt && step.input == step.output));

    Ok(())
}

#[test]
fn frequencies_sum_to_one() {
    let alpha = Alphabet::russian();
    let freqs = character_frequencies(&alpha, SAMPLE);
    let total: f64 = freqs.iter().map(|(_, f)| f).sum();
    assert!((total - 1.0).abs() <= 1e-9);

    // "о" is the most common letter of the sample
    let (top, _) = freqs
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    assert_eq!(top, 'о');

    let empty = character_frequencies(&alpha, "");
    assert!(empty.iter().all(|&(_, f)| f == 0.0));
}
