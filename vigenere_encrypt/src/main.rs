use anyhow::{Context, Result};
use clap::Parser;
use kasiski::alphabet::Alphabet;
use kasiski::cipher::{decrypt, encrypt};
use kasiski::ioc::character_frequencies;
use std::fs;
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Width of the widest frequency bar
const BAR_WIDTH: f64 = 60.0;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// text to encrypt
    #[arg(short, long)]
    input: Option<String>,

    /// the file to read input from, must be UTF-8 text
    ///
    /// the program will read from stdin if neither input-file or input are set
    #[arg(long, conflicts_with = "input")]
    input_file: Option<PathBuf>,

    /// file to write the output to, -o=- => stdout
    #[arg(short, long, default_value_t = String::from("-"))]
    output: String,

    /// force writing to the output file, even if it already exists
    #[arg(short, long, default_value_t = false)]
    force: bool,

    /// key to use, anything that isn't a letter а-я is dropped
    #[arg(short, long)]
    key: String,

    /// decrypt the input instead of encrypting it
    #[arg(short, long, default_value_t = false)]
    decrypt: bool,

    /// print every step of the cipher to stderr
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// print the letter frequencies of the input and the output to stderr
    #[arg(long, default_value_t = false)]
    frequencies: bool,
}

fn print_frequencies(alpha: &Alphabet, title: &str, text: &str) {
    let freqs = character_frequencies(alpha, text);
    let max = freqs.iter().map(|&(_, f)| f).fold(0.0, f64::max);

    eprintln!("{title}:");
    for (c, f) in freqs {
        let bar = if max > 0.0 {
            (f / max * BAR_WIDTH).round() as usize
        } else {
            0
        };
        eprintln!("  {c} {:6.2}% {}", f * 100.0, "#".repeat(bar));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // read in the input text
    let input = if let Some(input_str) = args.input {
        input_str
    } else if let Some(ref input_file) = args.input_file {
        fs::read_to_string(input_file)
            .with_context(|| format!("Reading from {input_file:?} to get input data."))?
    } else {
        let mut data = String::new();
        io::stdin().read_to_string(&mut data)?;
        data
    };

    let alpha = Alphabet::russian();
    let res = if args.decrypt {
        decrypt(&alpha, &input, &args.key)
    } else {
        encrypt(&alpha, &input, &args.key)
    }
    .context("Running the cipher.")?;

    if args.trace {
        for step in &res.trace {
            eprintln!(
                "{:>5}: {} ({:>2}) {} {} ({:>2}) -> {} ({:>2})  {}",
                step.step,
                step.input,
                step.input_index,
                step.operation,
                step.key,
                step.key_index,
                step.output,
                step.output_index,
                step.formula
            );
        }
    }

    if args.frequencies {
        print_frequencies(&alpha, "input", &input);
        print_frequencies(&alpha, "output", &res.text);
    }

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

    // write the grouped output
    out.write_all(res.text.as_bytes())?;

    // if writing to stdout write a newline
    if args.output == "-" {
        out.write_all(b"\n")?;
    }

    Ok(())
}
