use anyhow::{Context, Result};
use clap::Parser;
use kasiski::alphabet::Alphabet;
use kasiski::attack::{run_attack_bytes, AttackConfig};
use kasiski::cipher::{decrypt_text, group_by_five};
use kasiski::recover::recover_key;
use std::fs;
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ciphertext to recover the Vigenère key of
    #[arg(short, long)]
    input: Option<String>,

    /// the file to read the ciphertext from, must be UTF-8 text
    ///
    /// the program will read from stdin if neither input-file or input are set
    #[arg(long, conflicts_with = "input")]
    input_file: Option<PathBuf>,

    /// file to write the decrypted text to, -o=- => stdout
    #[arg(short, long, default_value_t = String::from("-"))]
    output: String,

    /// force writing to the output file, even if it already exists
    #[arg(short, long, default_value_t = false)]
    force: bool,

    /// max length of key to try
    #[arg(long, default_value_t = 20)]
    max_key_length: usize,

    /// fraction of repeat distances a key length has to divide to be a candidate
    #[arg(short, long, default_value_t = 0.5)]
    threshold: f64,

    /// n-gram lengths to search for repeats, can be given more than once
    #[arg(short, long = "ngram", default_values_t = [3, 4, 5])]
    ngrams: Vec<usize>,

    /// skip key length estimation and use this length
    #[arg(short = 'l', long)]
    key_length: Option<usize>,

    /// pause after every progress line, in milliseconds
    #[arg(long, default_value_t = 150)]
    delay_ms: u64,

    /// don't print progress, and don't pause between steps
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// group the decrypted output into blocks of five letters
    #[arg(short, long, default_value_t = false)]
    group: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // read in the encrypted input
    let enc = if let Some(input_str) = args.input {
        input_str.into_bytes()
    } else if let Some(ref input_file) = args.input_file {
        fs::read(input_file)
            .with_context(|| format!("Reading from {input_file:?} to get the ciphertext."))?
    } else {
        let mut data = vec![];
        io::stdin().read_to_end(&mut data)?;
        data
    };

    let alpha = Alphabet::russian();
    let quiet = args.quiet;
    let report = |line: &dyn std::fmt::Display| {
        if !quiet {
            eprintln!("{line}");
        }
    };

    // break the cipher, or just the key letters if the length is known
    let key = if let Some(key_len) = args.key_length {
        let raw = std::str::from_utf8(&enc).context("Ciphertext is not UTF-8.")?;
        let text = alpha.normalize(raw);
        recover_key(&alpha, &text, key_len, |pos, total, partial| {
            report(&format_args!("key letter {}/{total}: {partial}", pos + 1))
        })?
    } else {
        let config = AttackConfig {
            ngram_lengths: args.ngrams,
            max_key_len: args.max_key_length,
            threshold: args.threshold,
            step_delay: if quiet {
                Duration::ZERO
            } else {
                Duration::from_millis(args.delay_ms)
            },
        };
        run_attack_bytes(&alpha, &enc, &config, |progress| report(&progress))?.key
    };

    eprintln!("Decrypting using key={key}, length={}", key.len());
    let text = alpha.normalize(std::str::from_utf8(&enc)?);
    let dec = decrypt_text(&alpha, &text, &key);
    let dec = if args.group {
        group_by_five(dec.as_str())
    } else {
        dec.to_string()
    };

    // choose whether to write to stdout or to a file
    let mut out: Box<dyn Write> = match args.output.as_str() {
        "-" => Box::new(std::io::stdout()),
        fname => Box::new(
            OpenOptions::new()
                .write(true)
                .create(true)
                .create_new(!args.force)
                .open(fname)
                .with_context(|| format!("Opening {fname:?} for writing output."))?,
        ),
    };

    // write the decrypted output
    out.write_all(dec.as_bytes())?;

    // if writing to stdout write a newline
    if args.output == "-" {
        out.write_all(b"\n")?;
    }

    Ok(())
}
