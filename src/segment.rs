//! Sentence splitting for the chunking pipeline.
//!
//! The boundary rule is deliberately simple: `.`, `!`, or `?` followed by
//! whitespace (or end of input) ends a sentence. Abbreviations, decimal
//! numbers, and quotation marks are not special-cased; that is a documented
//! limitation of the heuristic, not a bug.

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// True when the text already ends in terminal punctuation.
pub fn is_terminated(text: &str) -> bool {
    matches!(text.chars().last(), Some('.' | '!' | '?'))
}

/// Split text into trimmed, non-empty sentences in input order.
///
/// Every returned sentence ends in `.`, `!`, or `?`; a trailing fragment
/// without terminal punctuation gets a `.` appended. Total and
/// deterministic; empty input yields an empty vec.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // The match covers one ASCII terminator plus the whitespace run, so
        // the sentence ends one byte into the match.
        push_sentence(&mut sentences, &text[start..boundary.start() + 1]);
        start = boundary.end();
    }
    push_sentence(&mut sentences, &text[start..]);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return;
    }
    let mut sentence = trimmed.to_string();
    if !is_terminated(&sentence) {
        sentence.push('.');
    }
    sentences.push(sentence);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_each_terminator_followed_by_whitespace() {
        let sentences = split_sentences("Hello world. This is a test! Is it working?");
        assert_eq!(
            sentences,
            vec!["Hello world.", "This is a test!", "Is it working?"]
        );
    }

    #[test]
    fn terminator_without_following_whitespace_does_not_split() {
        let sentences = split_sentences("Version 1.5 shipped today. Done.");
        assert_eq!(sentences, vec!["Version 1.5 shipped today.", "Done."]);
    }

    #[test]
    fn trailing_fragment_gets_a_period() {
        let sentences = split_sentences("First one. second without ending");
        assert_eq!(sentences, vec!["First one.", "second without ending."]);
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t  ").is_empty());
    }

    #[test]
    fn every_sentence_is_trimmed_and_terminated() {
        let text = "  spaced out .  next!\n\nlast one\t";
        for sentence in split_sentences(text) {
            assert_eq!(sentence, sentence.trim());
            assert!(!sentence.is_empty());
            assert!(is_terminated(&sentence));
        }
    }

    #[test]
    fn multi_terminator_runs_stay_with_their_sentence() {
        let sentences = split_sentences("Wait... really? Yes!");
        assert_eq!(sentences, vec!["Wait...", "really?", "Yes!"]);
    }

    #[test]
    fn newlines_count_as_boundary_whitespace() {
        let sentences = split_sentences("One.\nTwo.\r\nThree.");
        assert_eq!(sentences, vec!["One.", "Two.", "Three."]);
    }
}
