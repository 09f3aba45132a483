//! Section rendering behind a narrow trait.
//!
//! Extraction never touches the `epub` crate directly; it walks an opaque
//! spine and asks the renderer for plain text one section at a time. That
//! keeps the container format swappable and lets tests drive extraction with
//! a scripted renderer instead of real files.

use anyhow::{Context, Result, anyhow};
use epub::doc::EpubDoc;
use std::io::Cursor;
use tracing::debug;

/// Title and creator pulled from the container, when present.
#[derive(Debug, Clone, Default)]
pub struct DocMetadata {
    pub title: Option<String>,
    pub creator: Option<String>,
}

/// Handle to one spine entry, in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRef {
    index: usize,
}

impl SectionRef {
    pub(crate) fn new(index: usize) -> Self {
        Self { index }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

/// One open document during extraction. Implementations own whatever
/// transient state rendering needs and give it back in `close`, which must
/// tolerate being called after a failure or more than once.
pub trait SectionRenderer {
    fn metadata(&self) -> DocMetadata;
    fn spine(&self) -> Vec<SectionRef>;
    fn render(&mut self, section: &SectionRef) -> Result<String>;
    fn close(&mut self) -> Result<()>;
}

/// Renderer over a real EPUB container held in memory.
pub struct EpubRenderer {
    doc: Option<EpubDoc<Cursor<Vec<u8>>>>,
    spine_len: usize,
}

impl EpubRenderer {
    /// Parse an EPUB container from bytes already read off disk.
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let doc = EpubDoc::from_reader(Cursor::new(bytes))
            .context("failed to parse EPUB container")?;
        let spine_len = doc.get_num_chapters();
        debug!(sections = spine_len, "opened EPUB container");
        Ok(Self {
            doc: Some(doc),
            spine_len,
        })
    }
}

impl SectionRenderer for EpubRenderer {
    fn metadata(&self) -> DocMetadata {
        match &self.doc {
            Some(doc) => DocMetadata {
                title: doc.mdata("title").map(|m| m.value.clone()),
                creator: doc.mdata("creator").map(|m| m.value.clone()),
            },
            None => DocMetadata::default(),
        }
    }

    fn spine(&self) -> Vec<SectionRef> {
        (0..self.spine_len).map(SectionRef::new).collect()
    }

    fn render(&mut self, section: &SectionRef) -> Result<String> {
        let doc = self.doc.as_mut().context("renderer already closed")?;
        doc.set_current_chapter(section.index());
        let (content, _mime) = doc
            .get_current_str()
            .with_context(|| format!("no content for section {}", section.index()))?;
        // Large width so no hard line breaks get baked into the text.
        let plain = match html2text::from_read(content.as_bytes(), 10_000) {
            Ok(clean) => clean,
            Err(err) => {
                return Err(anyhow!(
                    "markup strip failed in section {}: {err}",
                    section.index()
                ));
            }
        };
        Ok(plain.trim().to_string())
    }

    fn close(&mut self) -> Result<()> {
        if self.doc.take().is_some() {
            debug!("released EPUB container");
        }
        Ok(())
    }
}
