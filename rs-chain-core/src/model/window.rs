/// Splits a corpus into words on any whitespace, line breaks included.
///
/// Punctuation stays attached to its word: sentence detection later relies
/// on the trailing `.`, `!` or `?` of the last word of a sentence.
pub fn split_words(text: &str) -> Vec<&str> {
	text.split_whitespace().collect()
}

/// Joins words into a prefix key.
///
/// Words never contain whitespace, so a single space keeps keys unambiguous.
pub fn join_key<S: AsRef<str>>(words: &[S]) -> String {
	let mut key = String::new();
	for (i, word) in words.iter().enumerate() {
		if i > 0 {
			key.push(' ');
		}
		key.push_str(word.as_ref());
	}
	key
}

/// Sliding scan over a word sequence yielding `(prefix, suffix)` pairs.
///
/// At position `i` the prefix covers words `max(0, i + 1 - prefix_length) ..= i`
/// and the suffix is word `i + 1`. The first `prefix_length - 1` prefixes are
/// therefore shorter (ramp-up), after which the window is exactly
/// `prefix_length` words wide and advances one word per step.
///
/// The scan is finite and holds its own index; scanning again means creating
/// a new `PrefixWindows`.
#[derive(Debug, Clone)]
pub struct PrefixWindows<'a> {
	words: &'a [&'a str],
	prefix_length: usize,
	index: usize,
}

impl<'a> PrefixWindows<'a> {
	/// Starts a scan at index 0.
	///
	/// `prefix_length` is expected to be >= 1; a zero length is treated as 1.
	pub fn new(words: &'a [&'a str], prefix_length: usize) -> Self {
		Self { words, prefix_length: prefix_length.max(1), index: 0 }
	}
}

impl<'a> Iterator for PrefixWindows<'a> {
	type Item = (String, &'a str);

	fn next(&mut self) -> Option<Self::Item> {
		let i = self.index;
		let suffix = *self.words.get(i + 1)?;
		let start = (i + 1).saturating_sub(self.prefix_length);
		self.index += 1;
		Some((join_key(&self.words[start..=i]), suffix))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.words.len().saturating_sub(self.index + 1);
		(remaining, Some(remaining))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn split_keeps_punctuation_and_drops_newlines() {
		let words = split_words("Hello,  world!\nHow are\tyou?\r\n");
		assert_eq!(words, vec!["Hello,", "world!", "How", "are", "you?"]);
	}

	#[test]
	fn ramp_up_then_fixed_width() {
		let words = split_words("a b c d e");
		let pairs: Vec<(String, &str)> = PrefixWindows::new(&words, 3).collect();
		assert_eq!(
			pairs,
			vec![
				("a".to_owned(), "b"),
				("a b".to_owned(), "c"),
				("a b c".to_owned(), "d"),
				("b c d".to_owned(), "e"),
			]
		);
	}

	#[test]
	fn prefix_longer_than_corpus_only_ramps_up() {
		let words = split_words("one two three");
		let keys: Vec<String> = PrefixWindows::new(&words, 10).map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["one".to_owned(), "one two".to_owned()]);
	}

	#[test]
	fn empty_and_single_word_yield_nothing() {
		let empty: Vec<&str> = Vec::new();
		assert_eq!(PrefixWindows::new(&empty, 2).count(), 0);
		let single = vec!["alone"];
		assert_eq!(PrefixWindows::new(&single, 2).count(), 0);
	}

	#[test]
	fn size_hint_matches_count() {
		let words = split_words("a b c d");
		let mut scan = PrefixWindows::new(&words, 2);
		assert_eq!(scan.size_hint(), (3, Some(3)));
		scan.next();
		assert_eq!(scan.size_hint(), (2, Some(2)));
		assert_eq!(scan.count(), 2);
	}
}
