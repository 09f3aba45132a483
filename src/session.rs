//! A reading session over one open book.
//!
//! The session owns the cursor (which chunk is on screen) and the visited
//! set. The cursor is persisted on every move and restored on open. The
//! visited set is deliberately not persisted: it caps word counting at once
//! per chunk within a session, while rereading in a later session counts
//! again.

use crate::gesture::{self, SwipeCommand};
use crate::model::{Book, Chunk};
use crate::progress::ReadingProgress;
use crate::storage::{self, KeyValueStore};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("chunk index {index} is out of range (book has {count} chunks)")]
    OutOfRange { index: usize, count: usize },
}

pub struct ReadingSession<'b> {
    book: &'b Book,
    store: Box<dyn KeyValueStore>,
    progress: ReadingProgress,
    swipe_threshold: f32,
    current_index: usize,
    visited: HashSet<u32>,
}

impl<'b> ReadingSession<'b> {
    /// Open a session on `book`, restoring the persisted cursor. A position
    /// saved against a longer version of the book clamps to the last chunk.
    pub fn open(
        book: &'b Book,
        store: Box<dyn KeyValueStore>,
        progress: ReadingProgress,
        swipe_threshold: f32,
    ) -> Self {
        let last = book.chunk_count().saturating_sub(1);
        let restored = store
            .get(storage::keys::READING_POSITION)
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(0);
        let current_index = restored.min(last);
        if restored > last {
            debug!(restored, clamped = current_index, "saved position past book end, clamping");
        }
        Self {
            book,
            store,
            progress,
            swipe_threshold,
            current_index,
            visited: HashSet::new(),
        }
    }

    /// Jump to a chunk by index. The first visit to a chunk in this session
    /// adds its word count to today's progress.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        let count = self.book.chunk_count();
        if index >= count {
            return Err(SessionError::OutOfRange { index, count });
        }
        self.move_to(index);
        Ok(())
    }

    /// Step by `delta` chunks, clamped to the book. Steps past either end
    /// settle on the boundary; a step that lands where we already are does
    /// nothing.
    pub fn advance(&mut self, delta: i64) {
        let last = self.book.chunk_count().saturating_sub(1) as i64;
        let target = (self.current_index as i64 + delta).clamp(0, last) as usize;
        if target != self.current_index {
            self.move_to(target);
        }
    }

    /// Feed a raw gesture delta through interpretation; a recognized swipe
    /// moves exactly one chunk.
    pub fn handle_scroll(&mut self, delta: f32) {
        match gesture::interpret(delta, self.swipe_threshold) {
            Some(SwipeCommand::Forward) => self.advance(1),
            Some(SwipeCommand::Backward) => self.advance(-1),
            None => debug!(delta, "gesture below threshold, ignored"),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_chunk(&self) -> &Chunk {
        &self.book.chunks[self.current_index]
    }

    pub fn progress(&self) -> &ReadingProgress {
        &self.progress
    }

    fn move_to(&mut self, index: usize) {
        self.current_index = index;
        self.store
            .set(storage::keys::READING_POSITION, &index.to_string());

        let chunk = &self.book.chunks[index];
        if self.visited.insert(chunk.id) {
            self.progress.add_words(chunk.word_count());
        }
    }
}
