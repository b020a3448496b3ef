//! # RNASynth CLI
//!
//! Command-line front end for classifier-guided RNA sequence synthesis.
//!
//! ## Usage
//!
//! ```bash
//! # Fit on seed sequences and synthesize candidates
//! rnasynth -i seeds.fasta -o synthesized.fasta
//!
//! # More designs per constraint, permissive filtering
//! rnasynth -i seeds.fasta -n 5 --threshold-out 0.0
//!
//! # Reproducible run
//! rnasynth -i seeds.fasta --seed 42
//! ```
//!
//! ## Options
//!
//! - `-i, --input <FILE>`: Seed FASTA file (required)
//! - `-o, --output <FILE>`: Output FASTA file (default: stdout)
//! - `-n, --count <N>`: Designed sequences per constraint (default: 3)
//! - `--threshold-in <X>`: Pre-design score gate (default: 0)
//! - `--threshold-out <X>`: Post-design score gate (default: 1)
//! - `--negatives <N>`: Shuffled negatives per seed (default: 2)
//! - `--shuffle-order <N>`: Shuffle chunk size (default: 2)
//! - `--seed <N>`: RNG seed (default: 1)
//! - `-q, --quiet`: Suppress progress logging

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::{Arg, ArgAction, Command};
use rnasynth_core::io::{read_fasta_sequences, write_fasta};
use rnasynth_core::{SynthConfig, Synthesizer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("rnasynth")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Classifier-guided RNA sequence synthesis")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .required(true)
                .help("Seed FASTA file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output FASTA file (default: stdout)"),
        )
        .arg(
            Arg::new("count")
                .short('n')
                .long("count")
                .value_name("N")
                .default_value("3")
                .help("Designed sequences per constraint"),
        )
        .arg(
            Arg::new("threshold-in")
                .long("threshold-in")
                .value_name("SCORE")
                .allow_negative_numbers(true)
                .default_value("0")
                .help("Candidate graphs must score strictly above this before design"),
        )
        .arg(
            Arg::new("threshold-out")
                .long("threshold-out")
                .value_name("SCORE")
                .allow_negative_numbers(true)
                .default_value("1")
                .help("Designed sequences must score strictly above this after refolding"),
        )
        .arg(
            Arg::new("negatives")
                .long("negatives")
                .value_name("N")
                .default_value("2")
                .help("Shuffled negatives per seed sequence"),
        )
        .arg(
            Arg::new("shuffle-order")
                .long("shuffle-order")
                .value_name("N")
                .default_value("2")
                .help("Chunk size of the negative-generation shuffle"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .default_value("1")
                .help("RNG seed"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppress progress logging"),
        )
        .get_matches();

    let quiet = matches.get_flag("quiet");
    env_logger::Builder::from_default_env()
        .filter_level(if quiet {
            log::LevelFilter::Off
        } else {
            log::LevelFilter::Info
        })
        .init();

    let config = SynthConfig {
        n_synthesized_seqs_per_seed_seq: matches.get_one::<String>("count").unwrap().parse()?,
        instance_score_threshold_in: matches.get_one::<String>("threshold-in").unwrap().parse()?,
        instance_score_threshold_out: matches
            .get_one::<String>("threshold-out")
            .unwrap()
            .parse()?,
        negative_shuffle_ratio: matches.get_one::<String>("negatives").unwrap().parse()?,
        shuffle_order: matches.get_one::<String>("shuffle-order").unwrap().parse()?,
        rng_seed: matches.get_one::<String>("seed").unwrap().parse()?,
        ..SynthConfig::default()
    };

    let input = matches.get_one::<String>("input").unwrap();
    let seeds = read_fasta_sequences(input)?;
    log::info!("read {} seed sequences from {input}", seeds.len());

    let mut synthesizer = Synthesizer::new(config)?;
    let synthesized = synthesizer
        .fit_sample(seeds)?
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("synthesized {} sequences", synthesized.len());

    match matches.get_one::<String>("output") {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_fasta(&mut writer, synthesized)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_fasta(&mut writer, synthesized)?;
        }
    }
    Ok(())
}
