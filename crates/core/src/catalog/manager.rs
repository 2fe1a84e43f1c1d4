//! # Catalog Manager
//!
//! Owns the canonical book collection. Every mutation is applied to a copy,
//! the whole copy is written to the store under a single key, and only then
//! does it replace the in-memory collection. A failed write therefore leaves
//! both memory and storage as they were.
//!
//! Unknown ids are never errors: update, delete, checkout and checkin report
//! whether they touched anything and otherwise leave the collection alone.

use chrono::NaiveDate;
use std::sync::Arc;

use super::book::{Book, BookId, Loan, NewBook};
use super::clock::{Clock, SystemClock};
use super::query::{self, CatalogStats, SortOptions};
use super::seed::sample_books;
use super::transfer::{self, ExportFile};
use crate::error::{CatalogError, CatalogResult};
use crate::state::KeyValueStore;

/// Key the collection is stored under unless configured otherwise
pub const STORAGE_KEY: &str = "library-books";

pub struct CatalogManager {
    books: Vec<Book>,
    store: Arc<dyn KeyValueStore>,
    key: String,
    clock: Arc<dyn Clock>,
}

impl CatalogManager {
    /// Load the catalog from `store` under the default key
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        Self::load_with(store, STORAGE_KEY, Arc::new(SystemClock))
    }

    /// Load the catalog with an explicit key and clock
    pub fn load_with(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut manager = Self {
            books: Vec::new(),
            store,
            key: key.into(),
            clock,
        };
        manager.reload();
        manager
    }

    /// Re-read the collection from storage.
    ///
    /// A missing key seeds and stores the sample collection. An unreadable
    /// payload also falls back to the samples; a copy of it is kept under
    /// [`unreadable_key`](Self::unreadable_key) because the next mutation
    /// replaces the original.
    pub fn reload(&mut self) {
        match self.store.get(&self.key) {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<Book>>(&payload) {
                Ok(books) => {
                    tracing::debug!(key = %self.key, count = books.len(), "Catalog loaded");
                    self.books = books;
                }
                Err(e) => {
                    tracing::error!(key = %self.key, error = %e, "Stored catalog is unreadable, using sample books");
                    self.preserve_unreadable(&payload);
                    self.books = sample_books();
                }
            },
            Ok(None) => {
                tracing::info!(key = %self.key, "No stored catalog, seeding sample books");
                self.books = sample_books();
                if let Err(e) = self.write(&self.books) {
                    tracing::warn!(error = %e, "Failed to store sample books");
                }
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read catalog, using sample books");
                self.books = sample_books();
            }
        }
    }

    /// Read-only view of the collection in catalog order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|b| &b.id == id)
    }

    /// Current date according to the manager's clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Key holding the last payload that failed to load
    pub fn unreadable_key(&self) -> String {
        format!("{}-unreadable", self.key)
    }

    fn preserve_unreadable(&self, payload: &str) {
        let backup = self.unreadable_key();
        match self.store.set(&backup, payload) {
            Ok(()) => tracing::warn!(key = %backup, "Unreadable catalog copied aside"),
            Err(e) => tracing::error!(key = %backup, error = %e, "Failed to copy unreadable catalog aside"),
        }
    }

    fn write(&self, books: &[Book]) -> CatalogResult<()> {
        let payload = serde_json::to_string(books)?;
        self.store
            .set(&self.key, &payload)
            .map_err(CatalogError::Persistence)
    }

    /// Run `change` on a copy of the collection, persist it, then adopt it
    fn apply<T>(&mut self, change: impl FnOnce(&mut Vec<Book>) -> T) -> CatalogResult<T> {
        let mut next = self.books.clone();
        let outcome = change(&mut next);
        self.write(&next)?;
        self.books = next;
        Ok(outcome)
    }

    fn fresh_id(&self) -> BookId {
        loop {
            let id = BookId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Catalogue a new, available book at the end of the collection
    pub fn add_book(&mut self, fields: NewBook) -> CatalogResult<Book> {
        let book = Book::new(self.fresh_id(), fields);
        let added = book.clone();
        self.apply(move |books| books.push(added))?;

        tracing::info!(book_id = %book.id, title = %book.title, "Book added");
        Ok(book)
    }

    /// Replace the record with the same id in place.
    /// Returns `false` when no record has that id.
    pub fn update_book(&mut self, book: Book) -> CatalogResult<bool> {
        let id = book.id.clone();
        let matched = self.apply(move |books| match books.iter_mut().find(|b| b.id == book.id) {
            Some(slot) => {
                *slot = book;
                true
            }
            None => false,
        })?;

        if matched {
            tracing::info!(book_id = %id, "Book updated");
        } else {
            tracing::debug!(book_id = %id, "Update ignored, no such book");
        }
        Ok(matched)
    }

    /// Remove the record with `id`. Returns `false` when it was not present.
    pub fn delete_book(&mut self, id: &BookId) -> CatalogResult<bool> {
        let removed = self.apply(|books| {
            let before = books.len();
            books.retain(|b| &b.id != id);
            books.len() != before
        })?;

        if removed {
            tracing::info!(book_id = %id, "Book deleted");
        } else {
            tracing::debug!(book_id = %id, "Delete ignored, no such book");
        }
        Ok(removed)
    }

    /// Lend a book until `return_date`, starting today.
    ///
    /// A book already on loan has its loan replaced. Returns `false` when no
    /// record has `id`.
    pub fn check_out_book(
        &mut self,
        id: &BookId,
        borrower: &str,
        return_date: NaiveDate,
    ) -> CatalogResult<bool> {
        let loan = Loan {
            borrower: borrower.to_string(),
            checked_out_on: Some(self.clock.today()),
            return_date,
        };

        let replaced = self.apply(|books| {
            books
                .iter_mut()
                .find(|b| &b.id == id)
                .map(|b| b.loan.replace(loan))
        })?;

        match replaced {
            None => {
                tracing::debug!(book_id = %id, "Checkout ignored, no such book");
                Ok(false)
            }
            Some(Some(previous)) => {
                tracing::warn!(
                    book_id = %id,
                    previous_borrower = %previous.borrower,
                    borrower = %borrower,
                    "Book was already checked out, loan replaced"
                );
                Ok(true)
            }
            Some(None) => {
                tracing::info!(book_id = %id, borrower = %borrower, %return_date, "Book checked out");
                Ok(true)
            }
        }
    }

    /// Return a book, clearing its loan.
    /// Returns `true` only when a loan was actually closed.
    pub fn check_in_book(&mut self, id: &BookId) -> CatalogResult<bool> {
        let closed = self.apply(|books| {
            books
                .iter_mut()
                .find(|b| &b.id == id)
                .and_then(|b| b.loan.take())
        })?;

        match &closed {
            Some(loan) => {
                tracing::info!(book_id = %id, borrower = %loan.borrower, "Book checked in")
            }
            None => tracing::debug!(book_id = %id, "Checkin ignored, book not on loan"),
        }
        Ok(closed.is_some())
    }

    /// Filtered, sorted copy of the collection
    pub fn filter_and_sort(
        &self,
        query: &str,
        sort: SortOptions,
        checked_out: Option<bool>,
    ) -> Vec<Book> {
        let result = query::filter_and_sort(&self.books, query, sort, checked_out);
        tracing::debug!(query = %query, matched = result.len(), "Catalog filtered");
        result
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::collect(&self.books)
    }

    /// Books whose return date has passed, in catalog order
    pub fn overdue_books(&self) -> Vec<Book> {
        let today = self.clock.today();
        self.books
            .iter()
            .filter(|b| b.loan.as_ref().is_some_and(|loan| loan.is_overdue(today)))
            .cloned()
            .collect()
    }

    /// Replace the whole collection with a validated import payload.
    ///
    /// The payload is stored verbatim. Nothing changes when it is rejected.
    pub fn import(&mut self, payload: &str) -> CatalogResult<usize> {
        let books = transfer::validate_import(payload)?;
        self.store
            .set(&self.key, payload)
            .map_err(CatalogError::Persistence)?;
        self.books = books;

        tracing::info!(count = self.books.len(), "Catalog imported");
        Ok(self.books.len())
    }

    /// Persisted payload packaged as a dated backup file
    pub fn export(&self) -> CatalogResult<Option<ExportFile>> {
        transfer::export(self.store.as_ref(), &self.key, self.clock.today())
    }

    /// Drop everything stored and start over from the sample collection
    pub fn reset(&mut self) -> CatalogResult<()> {
        self.apply(|books| *books = sample_books())?;

        tracing::info!(key = %self.key, "Catalog reset to sample books");
        Ok(())
    }
}
