//! Built-in sample collection used when nothing has been stored yet.

use chrono::NaiveDate;

use super::book::{Book, BookId, Loan};

fn sample(
    id: &str,
    title: &str,
    author: &str,
    isbn: &str,
    year: i32,
    genre: &str,
    cover: &str,
) -> Book {
    Book {
        id: BookId::from(id),
        title: title.to_string(),
        author: author.to_string(),
        isbn: Some(isbn.to_string()),
        publish_year: Some(year),
        genre: Some(genre.to_string()),
        cover_url: Some(cover.to_string()),
        loan: None,
    }
}

/// Three illustrative books, one of them on loan
pub fn sample_books() -> Vec<Book> {
    let mut orwell = sample(
        "2",
        "1984",
        "George Orwell",
        "9780451524935",
        1949,
        "Dystopian",
        "https://images.pexels.com/photos/1765033/pexels-photo-1765033.jpeg",
    );
    orwell.loan = Some(Loan {
        borrower: "Jane Smith".to_string(),
        checked_out_on: NaiveDate::from_ymd_opt(2023, 11, 15),
        return_date: NaiveDate::from_ymd_opt(2023, 12, 15).unwrap_or_default(),
    });

    vec![
        sample(
            "1",
            "To Kill a Mockingbird",
            "Harper Lee",
            "9780061120084",
            1960,
            "Classic",
            "https://images.pexels.com/photos/46274/pexels-photo-46274.jpeg",
        ),
        orwell,
        sample(
            "3",
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "9780743273565",
            1925,
            "Classic",
            "https://images.pexels.com/photos/3747139/pexels-photo-3747139.jpeg",
        ),
    ]
}
