/// Characters that may close a sentence after its terminal mark, as in `"Stop!"`.
const CLOSING_CHARS: &[char] = &['"', '\'', ')', ']', '”', '’', '»'];

/// Sentence-terminal punctuation.
const TERMINAL_CHARS: &[char] = &['.', '!', '?'];

/// Returns `true` if `word` is the last word of a sentence.
///
/// Closing quotes and brackets after the mark are ignored.
pub fn ends_sentence(word: &str) -> bool {
	word.trim_end_matches(CLOSING_CHARS).ends_with(TERMINAL_CHARS)
}

/// Cuts `words` after the last sentence-ending word.
///
/// Without any sentence-ending word the input is returned whole.
/// Cutting on word boundaries keeps every remaining word verbatim.
pub fn truncate_to_sentence<S: AsRef<str>>(words: &[S]) -> &[S] {
	match words.iter().rposition(|w| ends_sentence(w.as_ref())) {
		Some(last) => &words[..=last],
		None => words,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_terminal_marks() {
		assert!(ends_sentence("end."));
		assert!(ends_sentence("what?"));
		assert!(ends_sentence("stop!"));
		assert!(ends_sentence("said.\""));
		assert!(ends_sentence("(really?)"));
		assert!(!ends_sentence("comma,"));
		assert!(!ends_sentence("e.g"));
		assert!(!ends_sentence(""));
	}

	#[test]
	fn cuts_after_last_sentence() {
		let words = ["It", "rained.", "Then", "it", "stopped!", "And", "then"];
		assert_eq!(truncate_to_sentence(&words), &words[..5]);
	}

	#[test]
	fn no_boundary_keeps_everything() {
		let words = ["no", "boundary", "here"];
		assert_eq!(truncate_to_sentence(&words), &words[..]);
	}

	#[test]
	fn marks_inside_a_word_do_not_cut() {
		let words = ["It", "ended.Then", "more"];
		assert_eq!(truncate_to_sentence(&words), &words[..]);

		let words = ["Done.", "ended.Then", "more"];
		assert_eq!(truncate_to_sentence(&words), &words[..1]);
	}

	#[test]
	fn empty_input_stays_empty() {
		let words: [&str; 0] = [];
		assert!(truncate_to_sentence(&words).is_empty());
	}
}
