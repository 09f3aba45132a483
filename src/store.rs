//! The book library and the current-book pointer.
//!
//! Every mutation persists immediately. Write volume is a few events per
//! minute at most, so there is no batching; the persisted state is always
//! what the user last did.

use crate::model::Book;
use crate::progress::Clock;
use crate::storage::{self, KeyValueStore};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no book with id {id}")]
    NotFound { id: Uuid },
}

pub struct BookStore {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    books: Vec<Book>,
    current: Option<Book>,
}

impl BookStore {
    /// Load the library and current-book pointer from the store. Missing or
    /// unreadable records start an empty library rather than failing.
    pub fn load(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let books: Vec<Book> = store
            .get(storage::keys::BOOKS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let current: Option<Book> = store
            .get(storage::keys::CURRENT_BOOK)
            .and_then(|raw| serde_json::from_str(&raw).ok());
        debug!(books = books.len(), has_current = current.is_some(), "library loaded");
        Self {
            store,
            clock,
            books,
            current,
        }
    }

    /// Add a freshly extracted book at the front of the library and open it.
    pub fn add_book(&mut self, book: Book) {
        info!(title = %book.title, chunks = book.chunk_count(), "adding book");
        self.books.insert(0, book.clone());
        self.persist_books();
        self.set_current(book);
    }

    /// Open a book already in the library, stamping its last-read time.
    pub fn select_book(&mut self, id: Uuid) -> Result<Book, StoreError> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound { id })?;
        book.last_read = self.clock.now();
        let selected = book.clone();
        self.persist_books();
        self.set_current(selected.clone());
        Ok(selected)
    }

    /// Close the current book. It stays in the library; only the pointer and
    /// the persisted reading position go away.
    pub fn clear_current(&mut self) {
        self.current = None;
        self.store.remove(storage::keys::CURRENT_BOOK);
        self.store.remove(storage::keys::READING_POSITION);
    }

    /// The library in stored order, newest additions first.
    pub fn list_books(&self) -> &[Book] {
        &self.books
    }

    pub fn current_book(&self) -> Option<&Book> {
        self.current.as_ref()
    }

    fn set_current(&mut self, book: Book) {
        match serde_json::to_string(&book) {
            Ok(json) => self.store.set(storage::keys::CURRENT_BOOK, &json),
            Err(err) => debug!(%err, "current book did not serialize"),
        }
        self.current = Some(book);
    }

    fn persist_books(&mut self) {
        match serde_json::to_string(&self.books) {
            Ok(json) => self.store.set(storage::keys::BOOKS, &json),
            Err(err) => debug!(%err, "library did not serialize"),
        }
    }
}
