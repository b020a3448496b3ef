//! # RNASynth - Classifier-Guided RNA Sequence Synthesis
//!
//! A library for synthesizing new RNA sequences that are predicted to share
//! a learned structural and sequence property with a set of seed sequences.
//!
//! ## Overview
//!
//! The pipeline trains a binary classifier distinguishing seed sequences
//! from shuffled negatives over folded-structure graph features, extracts
//! position-level structure and sequence constraints from
//! classifier-annotated graphs, drives a constraint-based designer to
//! synthesize candidates, and filters the candidates with the same
//! classifier before returning them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rnasynth_core::{Synthesizer, SynthConfig};
//!
//! let mut synth = Synthesizer::new(SynthConfig::default())?;
//! let seeds = vec![
//!     ("seed1".to_string(), "GGGCGCAAAGCGCCC".to_string()),
//!     ("seed2".to_string(), "GGGCGGAAAACCGCCC".to_string()),
//! ];
//! for item in synth.fit_sample(seeds)? {
//!     let (header, sequence) = item?;
//!     println!(">{header}\n{sequence}");
//! }
//! # Ok::<(), rnasynth_core::SynthError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`graph`]: secondary-structure graphs and component analysis
//! - [`constraints`]: constraint extraction from annotated graphs
//! - [`engine`]: the fit / sample / predict control loop
//! - [`traits`]: capability interfaces of the collaborators
//! - [`fold`]: built-in base-pair-maximization folder
//! - [`features`]: hashed graph feature vectors and back-annotation
//! - [`model`] / [`training`]: linear classifier and cross-validated search
//! - [`design`]: GC-targeted constraint designer
//! - [`shuffle`]: negative-example generation
//! - [`io`]: FASTA reading and writing
//! - [`config`]: pipeline configuration
//! - [`types`]: core types and the error taxonomy
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T, SynthError>`](types::SynthError).
//! Per-item structural errors (malformed graph, empty graph) fail that
//! item's processing immediately; no skip-and-continue recovery exists
//! anywhere in the pipeline.

pub mod config;
pub mod constraints;
pub mod design;
pub mod engine;
pub mod features;
pub mod fold;
pub mod graph;
pub mod io;
pub mod model;
pub mod shuffle;
pub mod training;
pub mod traits;
pub mod types;

pub use config::SynthConfig;
pub use constraints::{ConstraintExtractor, ConstraintRecord};
pub use engine::Synthesizer;
pub use types::{SeqRecord, SynthError};
