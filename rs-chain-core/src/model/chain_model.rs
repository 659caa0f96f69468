use super::generation_input::{GenerationInput, StartSeed};
use super::sentence::truncate_to_sentence;
use super::suffixes::Suffixes;
use super::window::{PrefixWindows, join_key, split_words};
use crate::error::{ChainError, Result};
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// Random seed draws allowed per distinct key before giving up.
pub const SEED_ATTEMPTS_PER_KEY: usize = 8;

/// Word-level Markov chain mapping prefixes to the suffixes observed after them.
///
/// A `ChainModel` is built in a single pass over a corpus and is read-only
/// afterwards: generation only borrows it.
///
/// # Responsibilities
/// - Record every `(prefix, suffix)` observation of the window scan
/// - Select a seed prefix starting with an uppercase letter, with a bounded
///   number of random draws
/// - Walk the chain and cut the output at the last sentence boundary
///
/// # Invariants
/// - `prefix_length` is always >= 1
/// - Every key in `suffixes` has at least one suffix
/// - `keys` holds each key of `suffixes` exactly once, in first-seen order
/// - `seed_candidates` counts the keys starting with an uppercase letter
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChainModel {
	/// Width of a full prefix, in words
	prefix_length: usize,

	/// Prefix key (space-joined words) to its observed suffixes
	suffixes: HashMap<String, Suffixes>,

	/// Keys in first-seen order, indexed by random seed draws
	keys: Vec<String>,

	/// Number of keys usable as a random seed
	seed_candidates: usize,
}

/// Returns `true` if `key` may start a random walk.
pub fn is_seed_candidate(key: &str) -> bool {
	key.chars().next().is_some_and(char::is_uppercase)
}

impl ChainModel {
	/// Builds a model from a corpus.
	///
	/// The corpus is split on whitespace and scanned once with
	/// [`PrefixWindows`]. An empty corpus, or one with fewer words than
	/// `prefix_length`, gives a small or empty model rather than an error.
	///
	/// # Errors
	/// Returns `ChainError::InvalidPrefixLength` if `prefix_length` is 0.
	pub fn new(corpus: &str, prefix_length: usize) -> Result<Self> {
		if prefix_length == 0 {
			return Err(ChainError::InvalidPrefixLength(prefix_length));
		}

		let words = split_words(corpus);
		let mut suffixes: HashMap<String, Suffixes> = HashMap::new();
		let mut keys = Vec::new();
		let mut seed_candidates = 0;

		for (prefix, suffix) in PrefixWindows::new(&words, prefix_length) {
			if let Some(existing) = suffixes.get_mut(&prefix) {
				existing.push(suffix);
				continue;
			}
			if is_seed_candidate(&prefix) {
				seed_candidates += 1;
			}
			suffixes.insert(prefix.clone(), Suffixes::new(suffix));
			keys.push(prefix);
		}

		debug!(
			"built chain: {} words, prefix length {}, {} keys, {} seed candidates",
			words.len(),
			prefix_length,
			keys.len(),
			seed_candidates
		);

		Ok(Self { prefix_length, suffixes, keys, seed_candidates })
	}

	pub fn prefix_length(&self) -> usize {
		self.prefix_length
	}

	/// Number of distinct prefix keys.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Keys in the order they were first seen in the corpus.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.keys.iter().map(String::as_str)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.suffixes.contains_key(key)
	}

	/// Suffixes recorded for `key`, in corpus order with duplicates.
	pub fn suffixes(&self, key: &str) -> Option<&[String]> {
		self.suffixes.get(key).map(Suffixes::as_slice)
	}

	/// Number of keys starting with an uppercase letter.
	pub fn seed_candidates(&self) -> usize {
		self.seed_candidates
	}

	/// Default bound on random seed draws for this model.
	pub fn default_seed_attempts(&self) -> usize {
		SEED_ATTEMPTS_PER_KEY * self.keys.len().max(1)
	}

	/// Draws random keys until one starts with an uppercase letter.
	///
	/// At most `attempts` keys are drawn. A model without any seed candidate
	/// fails without drawing.
	///
	/// # Errors
	/// Returns `ChainError::NoSeed` when no acceptable key was drawn.
	pub fn random_seed<R: Rng + ?Sized>(&self, rng: &mut R, attempts: usize) -> Result<&str> {
		if self.seed_candidates == 0 {
			warn!("no seed available: {} keys, none starts with an uppercase letter", self.keys.len());
			return Err(ChainError::NoSeed { attempts: 0 });
		}

		for attempt in 1..=attempts {
			let key = &self.keys[rng.random_range(0..self.keys.len())];
			if is_seed_candidate(key) {
				debug!("seed '{key}' found after {attempt} draw(s)");
				return Ok(key.as_str());
			}
		}

		warn!("no seed available after {attempts} draws over {} keys", self.keys.len());
		Err(ChainError::NoSeed { attempts })
	}

	/// Generates text with the given random source and parameters.
	///
	/// The output starts with the seed, continues with at most
	/// `input.max_words` suffix words and is cut after its last
	/// sentence-ending word when there is one. The walk stops early when the
	/// current window is not a known prefix.
	///
	/// # Errors
	/// Returns `ChainError::NoSeed` if a random seed cannot be found.
	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, input: &GenerationInput) -> Result<String> {
		let seed = match input.start_seed() {
			StartSeed::Random => {
				let attempts = input.seed_attempts().unwrap_or_else(|| self.default_seed_attempts());
				self.random_seed(rng, attempts)?.to_owned()
			}
			StartSeed::Custom(seed) => seed.clone(),
		};

		let mut state: VecDeque<&str> = split_words(&seed).into();
		let mut output: Vec<&str> = state.iter().copied().collect();

		for _ in 0..input.max_words {
			let key = join_key(state.make_contiguous());
			let Some(next) = self.suffixes.get(&key).and_then(|s| s.pick(&mut *rng)) else {
				debug!("walk stopped on unknown prefix '{key}' after {} word(s)", output.len());
				break;
			};
			output.push(next);
			state.pop_front();
			state.push_back(next);
		}

		Ok(join_key(truncate_to_sentence(&output)))
	}

	/// Generates up to `max_words` words after a random seed using the
	/// thread-local random source.
	///
	/// Returns an empty string when no seed is available.
	pub fn generate(&self, max_words: usize) -> String {
		self.generate_with(&mut rand::rng(), &GenerationInput::new(max_words))
			.unwrap_or_default()
	}

	/// Serializes the model with `postcard`.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Restores a model serialized with [`ChainModel::to_bytes`].
	///
	/// # Errors
	/// Returns `ChainError::Codec` on malformed bytes and
	/// `ChainError::CorruptModel` if the decoded model breaks an invariant.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let model: Self = postcard::from_bytes(bytes)?;
		model.check()?;
		Ok(model)
	}

	/// Writes the serialized model to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		std::fs::write(path, self.to_bytes()?)?;
		Ok(())
	}

	/// Reads a model written by [`ChainModel::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_bytes(&std::fs::read(path)?)
	}

	fn check(&self) -> Result<()> {
		if self.prefix_length == 0 {
			return Err(ChainError::CorruptModel("prefix length is 0".to_owned()));
		}
		if self.keys.len() != self.suffixes.len() || self.keys.iter().any(|k| !self.suffixes.contains_key(k)) {
			return Err(ChainError::CorruptModel("key index does not match suffix table".to_owned()));
		}
		if self.suffixes.values().any(|s| s.len() == 0) {
			return Err(ChainError::CorruptModel("empty suffix list".to_owned()));
		}
		if self.keys.iter().filter(|k| is_seed_candidate(k)).count() != self.seed_candidates {
			return Err(ChainError::CorruptModel("seed candidate count mismatch".to_owned()));
		}
		Ok(())
	}
}
