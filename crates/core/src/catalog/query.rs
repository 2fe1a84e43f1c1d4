//! # Derived Queries
//!
//! Read-only views over the collection: text/checkout filtering, sorting by
//! an enumerated key, and aggregate statistics. Nothing here mutates the
//! books it is given.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::book::Book;

/// Field a listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Title,
    Author,
    PublishYear,
}

impl SortField {
    /// Ascending comparator for this field
    pub fn comparator(self) -> fn(&Book, &Book) -> Ordering {
        match self {
            Self::Title => compare_title,
            Self::Author => compare_author,
            Self::PublishYear => compare_publish_year,
        }
    }
}

fn compare_title(a: &Book, b: &Book) -> Ordering {
    a.title.to_lowercase().cmp(&b.title.to_lowercase())
}

fn compare_author(a: &Book, b: &Book) -> Ordering {
    a.author.to_lowercase().cmp(&b.author.to_lowercase())
}

fn compare_publish_year(a: &Book, b: &Book) -> Ordering {
    a.publish_year
        .unwrap_or(0)
        .cmp(&b.publish_year.unwrap_or(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortOptions {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOptions {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    fn compare(&self, a: &Book, b: &Book) -> Ordering {
        let ordering = (self.field.comparator())(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Case-insensitive substring match on title, author, genre or isbn.
/// An empty query matches everything.
pub fn matches_query(book: &Book, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let contains = |value: &str| value.to_lowercase().contains(&needle);

    contains(&book.title)
        || contains(&book.author)
        || book.genre.as_deref().is_some_and(contains)
        || book.isbn.as_deref().is_some_and(contains)
}

/// Filter then stable-sort `books` into a new list
pub fn filter_and_sort(
    books: &[Book],
    query: &str,
    sort: SortOptions,
    checked_out: Option<bool>,
) -> Vec<Book> {
    let mut matched: Vec<Book> = books
        .iter()
        .filter(|book| matches_query(book, query))
        .filter(|book| checked_out.map_or(true, |wanted| book.is_checked_out() == wanted))
        .cloned()
        .collect();

    // `sort_by` is stable, so equal keys keep collection order
    matched.sort_by(|a, b| sort.compare(a, b));
    matched
}

/// Aggregate counts over the collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub checked_out: usize,
    pub available: usize,
    pub genre_counts: HashMap<String, usize>,
}

impl CatalogStats {
    pub fn collect(books: &[Book]) -> Self {
        let total = books.len();
        let checked_out = books.iter().filter(|b| b.is_checked_out()).count();

        let mut genre_counts = HashMap::new();
        for genre in books
            .iter()
            .filter_map(|b| b.genre.as_ref())
            .filter(|g| !g.is_empty())
        {
            *genre_counts.entry(genre.clone()).or_insert(0) += 1;
        }

        Self {
            total,
            checked_out,
            available: total - checked_out,
            genre_counts,
        }
    }

    /// Most common genres first; ties ordered by name
    pub fn top_genres(&self, limit: usize) -> Vec<(String, usize)> {
        let mut genres: Vec<(String, usize)> = self
            .genre_counts
            .iter()
            .map(|(genre, count)| (genre.clone(), *count))
            .collect();
        genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        genres.truncate(limit);
        genres
    }

    pub fn percent_available(&self) -> u32 {
        percent(self.available, self.total)
    }

    pub fn percent_checked_out(&self) -> u32 {
        percent(self.checked_out, self.total)
    }
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}
