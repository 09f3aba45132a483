//! Greedy packing of sentences into bounded-length chunks.
//!
//! Sentences are never reordered and never split: each one either extends
//! the current chunk or starts the next. A single sentence longer than the
//! budget becomes its own oversized chunk, which keeps the output
//! sentence-aligned at the cost of an occasional long page.

use crate::model::Chunk;
use crate::segment::is_terminated;

/// Default chunk budget in bytes, sized for one screen of reading.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 475;

/// Pack sentences into chunks of at most `max_len` bytes each, assigning
/// sequential ids from `start_id`. Returns the chunks and the next unused
/// id, so callers can keep the counter running across sections.
pub fn pack_sentences(
    sentences: &[String],
    max_len: usize,
    start_id: u32,
) -> (Vec<Chunk>, u32) {
    let mut chunks = Vec::new();
    let mut next_id = start_id;
    let mut current = String::new();

    for sentence in sentences {
        // "+ 1" accounts for the joining space.
        if !current.is_empty() && current.len() + 1 + sentence.len() > max_len {
            seal(&mut chunks, &mut next_id, std::mem::take(&mut current));
            current = sentence.clone();
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
        }
    }

    if !current.is_empty() {
        seal(&mut chunks, &mut next_id, current);
    }

    (chunks, next_id)
}

fn seal(chunks: &mut Vec<Chunk>, next_id: &mut u32, buffer: String) {
    let mut content = buffer.trim().to_string();
    if content.is_empty() {
        return;
    }
    if !is_terminated(&content) {
        content.push('.');
    }
    chunks.push(Chunk {
        id: *next_id,
        content,
    });
    *next_id += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn short_sentences_share_one_chunk() {
        let input = sentences(&["Hello world.", "This is a test!", "Is it working?"]);
        let (chunks, next_id) = pack_sentences(&input, 100, 1);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 1);
        assert_eq!(chunks[0].content, "Hello world. This is a test! Is it working?");
        assert_eq!(next_id, 2);
    }

    #[test]
    fn sentences_near_the_budget_each_get_their_own_chunk() {
        let long = |filler: &str| {
            let mut s = filler.repeat(299 / filler.len() + 1);
            s.truncate(299);
            s.push('.');
            s
        };
        let input = vec![long("a "), long("b "), long("c ")];
        assert!(input.iter().all(|s| s.len() == 300));

        let (chunks, next_id) = pack_sentences(&input, 475, 1);

        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        for (chunk, sentence) in chunks.iter().zip(&input) {
            assert_eq!(&chunk.content, sentence);
        }
        assert_eq!(next_id, 4);
    }

    #[test]
    fn oversized_sentence_is_kept_whole() {
        let huge = format!("{}.", "x".repeat(900));
        let input = vec!["Small one.".to_string(), huge.clone(), "Tail.".to_string()];

        let (chunks, _) = pack_sentences(&input, 50, 1);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].content, huge);
        assert!(chunks[1].content.len() > 50);
    }

    #[test]
    fn packed_chunks_never_exceed_budget_unless_single_sentence() {
        let input = sentences(&[
            "One short line.",
            "Another short line.",
            "A third line here!",
            "And a question?",
            "Finally the last.",
        ]);
        let max_len = 40;
        let (chunks, _) = pack_sentences(&input, max_len, 1);

        for chunk in &chunks {
            let fits = chunk.content.len() <= max_len;
            let single = input.contains(&chunk.content);
            assert!(fits || single, "oversized multi-sentence chunk: {:?}", chunk);
        }
    }

    #[test]
    fn ids_continue_from_start_id_without_gaps() {
        let input = sentences(&["First.", "Second.", "Third."]);
        let (chunks, next_id) = pack_sentences(&input, 8, 7);

        assert_eq!(
            chunks.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![7, 8, 9]
        );
        assert_eq!(next_id, 10);
    }

    #[test]
    fn sealed_content_gains_terminal_punctuation() {
        let input = sentences(&["no terminator here"]);
        let (chunks, _) = pack_sentences(&input, 100, 1);
        assert_eq!(chunks[0].content, "no terminator here.");
    }

    #[test]
    fn empty_input_yields_no_chunks_and_keeps_the_counter() {
        let (chunks, next_id) = pack_sentences(&[], 475, 5);
        assert!(chunks.is_empty());
        assert_eq!(next_id, 5);
    }
}
