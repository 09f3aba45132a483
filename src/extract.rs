//! Turning an EPUB file into a `Book`.
//!
//! Extraction walks the container's spine one section at a time: render to
//! plain text, split into sentences, pack into chunks, report progress. The
//! walk is best-effort per section but strict about two things: the chunk id
//! counter runs unbroken across the whole book, and the renderer is closed on
//! every exit path, including cancellation and mid-loop failures.
//!
//! A fatal container problem does not fail the call. The caller always gets a
//! usable `Book`, degrading to a single placeholder chunk; only an unreadable
//! file (or cancellation) surfaces as an error.

use crate::cancel::CancelToken;
use crate::chunk;
use crate::model::{Book, Chunk, UNKNOWN_AUTHOR};
use crate::render::{EpubRenderer, SectionRenderer};
use crate::segment;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not read {}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("extraction cancelled")]
    Cancelled,
}

/// Snapshot of extraction progress, pushed to the observer as it happens.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Monotone non-decreasing, 0 through 100.
    pub percent: f32,
    pub status: String,
}

/// Receives progress while an extraction runs.
pub trait ProgressSink {
    fn update(&mut self, update: ProgressUpdate);
}

/// Sections processed so far against the spine length. Owns the arithmetic
/// that turns counts into percent values, so the walk itself carries no
/// mutable progress counters.
#[derive(Debug, Clone, Copy)]
struct SpineProgress {
    processed: usize,
    total: usize,
}

impl SpineProgress {
    fn new(total: usize) -> Self {
        Self {
            processed: 0,
            total,
        }
    }

    /// Mark one more section done and describe where the walk stands.
    fn advance(&mut self) -> ProgressUpdate {
        self.processed += 1;
        ProgressUpdate {
            percent: self.percent(),
            status: format!(
                "Processing section {} of {}...",
                self.processed, self.total
            ),
        }
    }

    fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f32 / self.total as f32 * 100.0
        }
    }
}

/// Extraction pipeline, parameterized by the chunk budget.
pub struct BookExtractor {
    max_chunk_len: usize,
}

impl BookExtractor {
    pub fn new(max_chunk_len: usize) -> Self {
        Self { max_chunk_len }
    }

    /// Extract a book from an EPUB file, reporting progress to `sink`.
    pub fn extract(&self, path: &Path, sink: &mut dyn ProgressSink) -> Result<Book, ExtractError> {
        self.extract_with_cancel(path, sink, None)
    }

    /// As `extract`, but aborts cleanly when `cancel` fires. The token is
    /// checked before the file read and again before each section.
    pub fn extract_with_cancel(
        &self,
        path: &Path,
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> Result<Book, ExtractError> {
        info!(path = %path.display(), "extracting book");
        sink.update(ProgressUpdate {
            percent: 0.0,
            status: "Reading file...".to_string(),
        });
        if cancelled(cancel) {
            sink.update(done_update("Cancelled."));
            return Err(ExtractError::Cancelled);
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                sink.update(done_update("Could not read the file."));
                return Err(ExtractError::UnreadableFile {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let fallback_title = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string());

        sink.update(ProgressUpdate {
            percent: 0.0,
            status: "Parsing book structure...".to_string(),
        });
        let mut renderer = match EpubRenderer::open(bytes) {
            Ok(renderer) => renderer,
            Err(err) => {
                warn!(path = %path.display(), %err, "container did not parse, degrading to placeholder");
                sink.update(done_update("Could not parse this book."));
                return Ok(Book::new(
                    fallback_title,
                    UNKNOWN_AUTHOR.to_string(),
                    Book::placeholder_chunks(),
                ));
            }
        };

        self.run(&mut renderer, &fallback_title, sink, cancel)
    }

    /// Drive a renderer to a finished book. The spine walk's outcome is
    /// captured first and `close` runs before it is inspected, so no early
    /// return can leak the renderer's transient state.
    fn run(
        &self,
        renderer: &mut dyn SectionRenderer,
        fallback_title: &str,
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> Result<Book, ExtractError> {
        let meta = renderer.metadata();
        let outcome = self.walk_spine(renderer, sink, cancel);

        if let Err(err) = renderer.close() {
            warn!(%err, "failed to release rendering resources");
        }

        let chunks = match outcome {
            Ok(chunks) => chunks,
            Err(err) => {
                sink.update(done_update("Cancelled."));
                return Err(err);
            }
        };

        let title = meta
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_title.to_string());
        let author = meta
            .creator
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        let chunks = if chunks.is_empty() {
            warn!(title = %title, "no readable text survived extraction, using placeholder");
            Book::placeholder_chunks()
        } else {
            chunks
        };

        info!(title = %title, chunks = chunks.len(), "extraction finished");
        sink.update(done_update("Done."));
        Ok(Book::new(title, author, chunks))
    }

    fn walk_spine(
        &self,
        renderer: &mut dyn SectionRenderer,
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Chunk>, ExtractError> {
        let spine = renderer.spine();
        let mut progress = SpineProgress::new(spine.len());
        let mut chunks = Vec::new();
        let mut next_id = 1u32;

        for (pos, section) in spine.iter().enumerate() {
            if cancelled(cancel) {
                info!(section = pos + 1, "extraction cancelled mid-walk");
                return Err(ExtractError::Cancelled);
            }

            match renderer.render(section) {
                Ok(text) => {
                    let sentences = segment::split_sentences(&text);
                    let (mut packed, id) =
                        chunk::pack_sentences(&sentences, self.max_chunk_len, next_id);
                    next_id = id;
                    debug!(
                        section = pos + 1,
                        sentences = sentences.len(),
                        chunks = packed.len(),
                        "packed section"
                    );
                    chunks.append(&mut packed);
                }
                Err(err) => {
                    warn!(section = pos + 1, %err, "skipping unreadable section");
                }
            }

            sink.update(progress.advance());
        }

        Ok(chunks)
    }
}

fn done_update(status: &str) -> ProgressUpdate {
    ProgressUpdate {
        percent: 100.0,
        status: status.to_string(),
    }
}

fn cancelled(cancel: Option<&CancelToken>) -> bool {
    cancel.is_some_and(CancelToken::is_cancelled)
}
