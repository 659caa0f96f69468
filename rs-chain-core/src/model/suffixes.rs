use rand::Rng;

use serde::{Deserialize, Serialize};

/// Suffixes observed after a single prefix.
///
/// Conceptually, this is the set of outgoing edges of one node in the
/// Markov chain. Instead of counting occurrences, every observation is kept
/// in insertion order, so a word seen three times appears three times.
///
/// ## Invariants
/// - Never empty once stored in a model (created with its first suffix)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Suffixes {
	words: Vec<String>,
}

impl Suffixes {
	/// Creates a list holding its first observation.
	pub fn new(first: &str) -> Self {
		Self { words: vec![first.to_owned()] }
	}

	/// Records one more observation of `word`.
	pub fn push(&mut self, word: &str) {
		self.words.push(word.to_owned());
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn as_slice(&self) -> &[String] {
		&self.words
	}

	/// Picks a suffix uniformly from the recorded observations.
	///
	/// Duplicate entries make frequent suffixes proportionally more likely.
	pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		if self.words.is_empty() {
			return None;
		}
		let index = rng.random_range(0..self.words.len());
		Some(self.words[index].as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn keeps_duplicates_in_order() {
		let mut suffixes = Suffixes::new("sat");
		suffixes.push("ran");
		suffixes.push("sat");
		assert_eq!(suffixes.len(), 3);
		assert_eq!(suffixes.as_slice(), ["sat", "ran", "sat"]);
	}

	#[test]
	fn pick_follows_frequency() {
		let mut suffixes = Suffixes::new("sat");
		for _ in 0..8 {
			suffixes.push("sat");
		}
		suffixes.push("ran");

		let mut rng = StdRng::seed_from_u64(7);
		let sat = (0..2000).filter(|_| suffixes.pick(&mut rng) == Some("sat")).count();
		// 90% expected
		assert!(sat > 1650 && sat < 1950, "sat picked {sat} times");
	}

	#[test]
	fn single_suffix_is_always_picked() {
		let suffixes = Suffixes::new("only");
		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..10 {
			assert_eq!(suffixes.pick(&mut rng), Some("only"));
		}
	}
}
