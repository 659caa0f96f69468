use crate::error::{ChainError, Result};
use crate::model::window::{join_key, split_words};

/// Strategy used to select the starting prefix of a walk.
///
/// # Variants
/// - `Random`: draw a key starting with an uppercase letter from the model.
/// - `Custom(String)`: start from the provided words. The walk stops at once
///   if they are not a known prefix, and the output is the seed itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartSeed {
	#[default]
	Random,
	Custom(String),
}

/// Parameters of a single generation call.
///
/// # Invariants
/// - `seed_attempts`, when set, is >= 1
/// - A custom seed always holds at least one word
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationInput {
	/// Maximum number of suffix words appended after the seed.
	pub max_words: usize,

	/// How the walk is seeded.
	start_seed: StartSeed,

	/// Upper bound on random seed draws; `None` uses the model default.
	seed_attempts: Option<usize>,
}

impl GenerationInput {
	/// Random seed, default retry bound.
	pub fn new(max_words: usize) -> Self {
		Self { max_words, ..Self::default() }
	}

	pub fn start_seed(&self) -> &StartSeed {
		&self.start_seed
	}

	pub fn seed_attempts(&self) -> Option<usize> {
		self.seed_attempts
	}

	/// Starts walks from `seed` instead of a random key.
	///
	/// Whitespace in `seed` is normalised to single spaces so it matches
	/// the key format of the model.
	///
	/// # Errors
	/// Returns `ChainError::EmptySeed` if `seed` holds no word.
	pub fn set_custom_seed(&mut self, seed: &str) -> Result<()> {
		let words = split_words(seed);
		if words.is_empty() {
			return Err(ChainError::EmptySeed);
		}
		self.start_seed = StartSeed::Custom(join_key(&words));
		Ok(())
	}

	pub fn set_random_seed(&mut self) {
		self.start_seed = StartSeed::Random;
	}

	/// Overrides the bound on random seed draws.
	///
	/// # Errors
	/// Returns `ChainError::InvalidSeedAttempts` for `0`.
	pub fn set_seed_attempts(&mut self, attempts: usize) -> Result<()> {
		if attempts == 0 {
			return Err(ChainError::InvalidSeedAttempts);
		}
		self.seed_attempts = Some(attempts);
		Ok(())
	}
}
