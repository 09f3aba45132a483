//! Core data types shared across the ingestion pipeline and the reader.
//!
//! A `Book` is immutable once extraction finishes; the store replaces whole
//! records rather than patching fields in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback author when the container carries no creator metadata.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Shown as the only chunk when nothing readable could be extracted.
pub const PLACEHOLDER_CONTENT: &str =
    "Could not extract content from this EPUB. Please try another file.";

/// One reading "page": a sentence-aligned slice of book text.
///
/// Ids are 1-based and sequential across the whole book, not per section.
/// Content always ends in `.`, `!`, or `?` and is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: u32,
    pub content: String,
}

impl Chunk {
    /// Whitespace-delimited word count of the trimmed content.
    pub fn word_count(&self) -> u64 {
        self.content.trim().split_whitespace().count() as u64
    }
}

/// An ingested book: metadata plus the full ordered chunk sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub last_read: DateTime<Utc>,
    pub chunks: Vec<Chunk>,
}

impl Book {
    /// Build a freshly extracted book, stamped with a new id and the current
    /// time as its first "last read" moment.
    pub fn new(title: String, author: String, chunks: Vec<Chunk>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            author,
            last_read: Utc::now(),
            chunks,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn word_count(&self) -> u64 {
        self.chunks.iter().map(Chunk::word_count).sum()
    }

    /// The single chunk every failed or empty extraction degrades to.
    pub fn placeholder_chunks() -> Vec<Chunk> {
        vec![Chunk {
            id: 1,
            content: PLACEHOLDER_CONTENT.to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_word_count_splits_on_any_whitespace() {
        let chunk = Chunk {
            id: 1,
            content: "  Hello   world.\nSecond\tline. ".to_string(),
        };
        assert_eq!(chunk.word_count(), 4);
    }

    #[test]
    fn placeholder_is_a_single_chunk_with_id_one() {
        let chunks = Book::placeholder_chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 1);
        assert_eq!(chunks[0].content, PLACEHOLDER_CONTENT);
    }
}
