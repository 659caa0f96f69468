//! Prefix/suffix Markov-chain text generation library.
//!
//! This crate provides a word-level Markov chain including:
//! - A window scan turning a corpus into `(prefix, suffix)` observations
//! - An immutable prefix → suffix-list model (`ChainModel`)
//! - Seeded, reproducible random walks that end on a sentence boundary
//! - Corpus loading helpers for callers that build from files
//!
//! Randomness is always injectable: every generating call has a variant
//! taking any `rand::Rng`, so a seeded `StdRng` gives repeatable output.

/// Chain model, window scan and generation logic.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// I/O utilities (file loading, path helpers).
pub mod io;

pub use error::{ChainError, Result};
