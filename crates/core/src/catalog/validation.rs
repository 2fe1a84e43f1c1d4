//! # Input Validation
//!
//! Checks applied where user input enters the system. The catalog manager
//! itself trusts its callers, so front ends run these before calling it.

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

use super::book::{Book, NewBook};
use crate::error::{CatalogResult, ValidationErrors};

/// 10 digits (last may be X) or 13 digits, with optional single separators
const ISBN_PATTERN: &str = r"^(?:\d[- ]?){9}[\dXx]$|^(?:\d[- ]?){13}$";

/// Loan length offered when the caller does not pick a return date
pub const DEFAULT_LOAN_DAYS: u64 = 14;

fn is_valid_isbn(isbn: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(ISBN_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(isbn))
}

fn check_fields(fields: &NewBook, today: NaiveDate, errors: &mut ValidationErrors) {
    if fields.title.trim().is_empty() {
        errors.push("title", "Title is required");
    }

    if fields.author.trim().is_empty() {
        errors.push("author", "Author is required");
    }

    if let Some(isbn) = fields.isbn.as_deref().filter(|s| !s.is_empty()) {
        if !is_valid_isbn(isbn) {
            errors.push("isbn", "ISBN must be 10 or 13 digits");
        }
    }

    if let Some(year) = fields.publish_year {
        let current_year = today.year();
        if year < 0 || year > current_year {
            errors.push(
                "publishYear",
                format!("Year must be between 0 and {}", current_year),
            );
        }
    }

    if let Some(url) = fields.cover_url.as_deref().filter(|s| !s.is_empty()) {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push("coverUrl", "Cover URL must start with http:// or https://");
        }
    }
}

/// Validate the fields of a book about to be added
pub fn validate_new_book(fields: &NewBook, today: NaiveDate) -> CatalogResult<()> {
    let mut errors = ValidationErrors::new();
    check_fields(fields, today, &mut errors);
    errors.into_result()
}

/// Validate an edited record before it replaces the stored one
pub fn validate_book(book: &Book, today: NaiveDate) -> CatalogResult<()> {
    let fields = NewBook {
        title: book.title.clone(),
        author: book.author.clone(),
        isbn: book.isbn.clone(),
        publish_year: book.publish_year,
        genre: book.genre.clone(),
        cover_url: book.cover_url.clone(),
    };
    validate_new_book(&fields, today)
}

/// Validate a checkout request for `book`
pub fn validate_checkout(
    book: &Book,
    borrower: &str,
    return_date: NaiveDate,
    today: NaiveDate,
) -> CatalogResult<()> {
    let mut errors = ValidationErrors::new();

    if let Some(loan) = &book.loan {
        errors.push(
            "book",
            format!(
                "'{}' is already checked out by {}",
                book.title, loan.borrower
            ),
        );
    }

    if borrower.trim().is_empty() {
        errors.push("borrower", "Borrower name is required");
    }

    if return_date < today {
        errors.push("returnDate", "Return date cannot be in the past");
    }

    errors.into_result()
}

/// Return date suggested for a loan starting `today`
pub fn default_return_date(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(DEFAULT_LOAN_DAYS))
        .unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::book::{BookId, Loan};
    use crate::error::CatalogError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn fields(title: &str, author: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            ..Default::default()
        }
    }

    fn errors_of(result: CatalogResult<()>) -> ValidationErrors {
        match result {
            Err(CatalogError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_book_passes() {
        let mut book = fields("Dune", "Frank Herbert");
        book.isbn = Some("978-0-441-01359-3".to_string());
        book.publish_year = Some(1965);
        book.cover_url = Some("https://example.com/dune.jpg".to_string());
        assert!(validate_new_book(&book, today()).is_ok());
    }

    #[test]
    fn test_title_and_author_required() {
        let errors = errors_of(validate_new_book(&fields("  ", ""), today()));
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("author"), Some("Author is required"));
    }

    #[test]
    fn test_isbn_formats() {
        for isbn in ["0451524934", "045152493X", "9780451524935", "978 0 451 52493 5"] {
            let mut book = fields("t", "a");
            book.isbn = Some(isbn.to_string());
            assert!(validate_new_book(&book, today()).is_ok(), "{} should pass", isbn);
        }

        for isbn in ["12345", "97804515249350", "978--0451524935", "abcdefghij"] {
            let mut book = fields("t", "a");
            book.isbn = Some(isbn.to_string());
            let errors = errors_of(validate_new_book(&book, today()));
            assert_eq!(errors.get("isbn"), Some("ISBN must be 10 or 13 digits"));
        }
    }

    #[test]
    fn test_publish_year_range() {
        let mut book = fields("t", "a");
        book.publish_year = Some(2025);
        let errors = errors_of(validate_new_book(&book, today()));
        assert_eq!(errors.get("publishYear"), Some("Year must be between 0 and 2024"));

        book.publish_year = Some(-1);
        assert!(validate_new_book(&book, today()).is_err());

        book.publish_year = Some(2024);
        assert!(validate_new_book(&book, today()).is_ok());
    }

    #[test]
    fn test_cover_url_scheme() {
        let mut book = fields("t", "a");
        book.cover_url = Some("ftp://example.com/c.jpg".to_string());
        let errors = errors_of(validate_new_book(&book, today()));
        assert!(errors.get("coverUrl").is_some());
    }

    #[test]
    fn test_checkout_validation() {
        let book = Book::new(BookId::from("1"), fields("Emma", "Jane Austen"));

        assert!(validate_checkout(&book, "Sam", today(), today()).is_ok());

        let errors = errors_of(validate_checkout(
            &book,
            " ",
            today().pred_opt().unwrap(),
            today(),
        ));
        assert_eq!(errors.get("borrower"), Some("Borrower name is required"));
        assert_eq!(errors.get("returnDate"), Some("Return date cannot be in the past"));
    }

    #[test]
    fn test_checkout_rejects_book_on_loan() {
        let mut book = Book::new(BookId::from("1"), fields("Emma", "Jane Austen"));
        book.loan = Some(Loan {
            borrower: "Ann".to_string(),
            checked_out_on: Some(today()),
            return_date: today(),
        });

        let errors = errors_of(validate_checkout(&book, "Sam", today(), today()));
        assert_eq!(errors.get("book"), Some("'Emma' is already checked out by Ann"));
    }

    #[test]
    fn test_default_return_date() {
        assert_eq!(
            default_return_date(today()),
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
    }
}
