//! # Book Records
//!
//! The catalog's only entity. A book's loan details are a single optional
//! [`Loan`], so a record is either fully on loan or fully available.
//!
//! On the wire (storage, import, export) a book is a flat camelCase object
//! with `isCheckedOut` and three optional loan fields; see [`BookRecord`].

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Opaque book identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An active loan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub borrower: String,
    /// Missing only for records imported without a checkout date
    pub checked_out_on: Option<NaiveDate>,
    pub return_date: NaiveDate,
}

impl Loan {
    /// Days left until the book is due; negative once overdue
    pub fn days_until_return(&self, today: NaiveDate) -> i64 {
        (self.return_date - today).num_days()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.return_date < today
    }
}

/// Everything a caller supplies when cataloguing a book
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publish_year: Option<i32>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
}

/// A catalogued book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookRecord", into = "BookRecord")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publish_year: Option<i32>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
    pub loan: Option<Loan>,
}

impl Book {
    /// Build an available book from caller-supplied fields
    pub fn new(id: BookId, fields: NewBook) -> Self {
        Self {
            id,
            title: fields.title,
            author: fields.author,
            isbn: fields.isbn,
            publish_year: fields.publish_year,
            genre: fields.genre,
            cover_url: fields.cover_url,
            loan: None,
        }
    }

    pub fn is_checked_out(&self) -> bool {
        self.loan.is_some()
    }
}

/// Flat serialized form of a [`Book`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub is_checked_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_out_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_out_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
}

/// A record flagged as checked out without the loan fields that must go with it
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("book '{id}' is checked out but has no {missing}")]
pub struct IncompleteLoan {
    pub id: BookId,
    pub missing: &'static str,
}

/// Blank strings count as absent metadata
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<BookRecord> for Book {
    type Error = IncompleteLoan;

    fn try_from(record: BookRecord) -> Result<Self, Self::Error> {
        let loan = if record.is_checked_out {
            let borrower = record.checked_out_by.ok_or_else(|| IncompleteLoan {
                id: record.id.clone(),
                missing: "checkedOutBy",
            })?;
            let return_date = record.return_date.ok_or_else(|| IncompleteLoan {
                id: record.id.clone(),
                missing: "returnDate",
            })?;
            Some(Loan {
                borrower,
                checked_out_on: record.checked_out_date,
                return_date,
            })
        } else {
            None
        };

        Ok(Self {
            id: record.id,
            title: record.title,
            author: record.author,
            isbn: present(record.isbn),
            publish_year: record.publish_year,
            genre: present(record.genre),
            cover_url: present(record.cover_url),
            loan,
        })
    }
}

impl From<Book> for BookRecord {
    fn from(book: Book) -> Self {
        let (checked_out_by, checked_out_date, return_date) = match book.loan {
            Some(loan) => (Some(loan.borrower), loan.checked_out_on, Some(loan.return_date)),
            None => (None, None, None),
        };

        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publish_year: book.publish_year,
            genre: book.genre,
            cover_url: book.cover_url,
            is_checked_out: checked_out_by.is_some(),
            checked_out_by,
            checked_out_date,
            return_date,
        }
    }
}
