//! Top-level module for the Markov-chain generation system.
//!
//! - Window scan over a word sequence (`PrefixWindows`)
//! - Per-prefix suffix lists (`Suffixes`)
//! - The immutable prefix → suffixes model (`ChainModel`)
//! - Sentence-boundary truncation of generated text
//! - Generation parameters (`GenerationInput`)
//! - A corpus-loading front door (`Generator`)

/// Prefix → suffix-list model with bounded seed selection and random walks.
pub mod chain_model;

/// Builds a `ChainModel` from corpus files and drives generation on it.
pub mod generator;

/// Generation parameters: word budget, seed strategy, retry bound.
pub mod generation_input;

/// Sentence-ending detection and output truncation.
pub mod sentence;

/// Ordered suffix list attached to a single prefix.
///
/// Duplicates are kept so uniform picks follow observed frequencies.
mod suffixes;

/// Word splitting and the sliding `(prefix, suffix)` scan used during construction.
pub mod window;
