//! Plain-text rendering of catalog views.

use bookshelf_core::catalog::{Book, CatalogStats};
use bookshelf_core::error::ValidationErrors;
use chrono::NaiveDate;

/// Number of genres shown in the stats view
pub const TOP_GENRES: usize = 5;

pub fn loan_status(book: &Book, today: NaiveDate) -> String {
    let Some(loan) = &book.loan else {
        return "available".to_string();
    };

    let days = loan.days_until_return(today);
    let when = match days {
        d if d < 0 => format!("{} days overdue", -d),
        0 => "due today".to_string(),
        1 => "1 day left".to_string(),
        d => format!("{} days left", d),
    };
    format!(
        "on loan to {}, due {} ({})",
        loan.borrower, loan.return_date, when
    )
}

/// One-line summary used by listings
pub fn book_line(book: &Book, today: NaiveDate) -> String {
    let mut line = format!("[{}] {} by {}", book.id, book.title, book.author);
    if let Some(year) = book.publish_year {
        line.push_str(&format!(" ({})", year));
    }
    if let Some(genre) = &book.genre {
        line.push_str(&format!(" [{}]", genre));
    }
    line.push_str(&format!(" - {}", loan_status(book, today)));
    line
}

pub fn book_details(book: &Book, today: NaiveDate) -> String {
    let mut lines = vec![
        format!("ID:       {}", book.id),
        format!("Title:    {}", book.title),
        format!("Author:   {}", book.author),
    ];
    if let Some(isbn) = &book.isbn {
        lines.push(format!("ISBN:     {}", isbn));
    }
    if let Some(year) = book.publish_year {
        lines.push(format!("Year:     {}", year));
    }
    if let Some(genre) = &book.genre {
        lines.push(format!("Genre:    {}", genre));
    }
    if let Some(cover) = &book.cover_url {
        lines.push(format!("Cover:    {}", cover));
    }
    lines.push(format!("Status:   {}", loan_status(book, today)));
    if let Some(since) = book.loan.as_ref().and_then(|l| l.checked_out_on) {
        lines.push(format!("Since:    {}", since));
    }
    lines.join("\n")
}

pub fn stats_report(stats: &CatalogStats) -> String {
    let mut lines = vec![
        format!("Total books:  {}", stats.total),
        format!(
            "Available:    {} ({}%)",
            stats.available,
            stats.percent_available()
        ),
        format!(
            "Checked out:  {} ({}%)",
            stats.checked_out,
            stats.percent_checked_out()
        ),
    ];

    let top = stats.top_genres(TOP_GENRES);
    lines.push(String::new());
    if top.is_empty() {
        lines.push("No genre data available".to_string());
    } else {
        lines.push("Top genres:".to_string());
        for (genre, count) in &top {
            lines.push(format!("  {:<20} {} books", genre, count));
        }
    }

    lines.push(String::new());
    lines.push(if stats.checked_out > stats.available {
        "Most of your books are currently out on loan.".to_string()
    } else {
        "Most of your books are currently available.".to_string()
    });
    if let Some((genre, count)) = top.first() {
        lines.push(format!(
            "Your collection is strongest in {} with {} books.",
            genre, count
        ));
    }
    if stats.total < 10 {
        lines.push(
            "Your library is still growing. Add more books to see detailed statistics."
                .to_string(),
        );
    }

    lines.join("\n")
}

pub fn validation_report(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|e| format!("  {}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("\n")
}
