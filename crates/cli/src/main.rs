//! Bookshelf CLI
//!
//! Command-line front end for the library catalog. Owns the catalog manager
//! for the duration of one command and validates user input before handing
//! it over.

mod render;

use anyhow::{Context, Result};
use bookshelf_core::catalog::{
    transfer, validation, Book, BookId, CatalogManager, NewBook, SortDirection, SortField,
    SortOptions,
};
use bookshelf_core::config::{CatalogConfig, StorageBackend};
use bookshelf_core::error::CatalogError;
use chrono::NaiveDate;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bookshelf - Library catalog and loan tracker")]
struct Args {
    /// Directory holding the catalog data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Storage backend
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// List books, optionally filtered and sorted
    List {
        /// Case-insensitive text matched against title, author, genre and ISBN
        #[arg(default_value = "")]
        query: String,
        /// Field to sort by
        #[arg(short, long, value_enum, default_value_t = SortArg::Title)]
        sort: SortArg,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Only books currently on loan
        #[arg(long, conflicts_with = "available")]
        checked_out: bool,
        /// Only books on the shelf
        #[arg(long)]
        available: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show one book in full
    Show { id: String },
    /// Add a book to the catalog
    Add(AddArgs),
    /// Edit fields of an existing book (pass "" to clear an optional field)
    Edit(EditArgs),
    /// Remove a book from the catalog
    Delete { id: String },
    /// Lend a book
    Checkout {
        id: String,
        /// Who is borrowing the book
        #[arg(short, long)]
        borrower: String,
        /// Return date (YYYY-MM-DD); defaults to two weeks from today
        #[arg(short, long)]
        due: Option<NaiveDate>,
    },
    /// Return a book
    Checkin { id: String },
    /// List books past their return date
    Overdue,
    /// Collection statistics
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Replace the catalog with a JSON backup
    Import { file: PathBuf },
    /// Write a dated JSON backup of the catalog
    Export {
        /// Directory to write the backup into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Remove all books and start over from the sample collection
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Print the JSON Schema of the import format
    Schema,
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
    #[arg(short, long)]
    title: String,
    #[arg(short, long)]
    author: String,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(short, long)]
    year: Option<i32>,
    #[arg(short, long)]
    genre: Option<String>,
    #[arg(long)]
    cover_url: Option<String>,
}

impl AddArgs {
    fn into_new_book(self) -> NewBook {
        NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: non_empty(self.isbn),
            publish_year: self.year,
            genre: non_empty(self.genre),
            cover_url: non_empty(self.cover_url),
        }
    }
}

#[derive(ClapArgs, Debug)]
struct EditArgs {
    id: String,
    #[arg(short, long)]
    title: Option<String>,
    #[arg(short, long)]
    author: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(short, long)]
    year: Option<i32>,
    /// Remove the publish year
    #[arg(long, conflicts_with = "year")]
    clear_year: bool,
    #[arg(short, long)]
    genre: Option<String>,
    #[arg(long)]
    cover_url: Option<String>,
}

impl EditArgs {
    /// Apply the requested edits to a copy of `book`
    fn apply(&self, book: &Book) -> Book {
        let mut edited = book.clone();
        if let Some(title) = &self.title {
            edited.title = title.trim().to_string();
        }
        if let Some(author) = &self.author {
            edited.author = author.trim().to_string();
        }
        if let Some(isbn) = &self.isbn {
            edited.isbn = non_empty(Some(isbn.clone()));
        }
        if self.clear_year {
            edited.publish_year = None;
        } else if let Some(year) = self.year {
            edited.publish_year = Some(year);
        }
        if let Some(genre) = &self.genre {
            edited.genre = non_empty(Some(genre.clone()));
        }
        if let Some(cover) = &self.cover_url {
            edited.cover_url = non_empty(Some(cover.clone()));
        }
        edited
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortArg {
    Title,
    Author,
    Year,
}

impl From<SortArg> for SortField {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Title => SortField::Title,
            SortArg::Author => SortField::Author,
            SortArg::Year => SortField::PublishYear,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum BackendArg {
    Memory,
    File,
    Sqlite,
}

impl From<BackendArg> for StorageBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Memory => StorageBackend::Memory,
            BackendArg::File => StorageBackend::File,
            BackendArg::Sqlite => StorageBackend::Sqlite,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &Args) -> Result<CatalogConfig> {
    let mut config = CatalogConfig::from_env()?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(backend) = args.backend {
        config.backend = backend.into();
    }
    Ok(config)
}

fn find_book<'a>(catalog: &'a CatalogManager, id: &BookId) -> Result<&'a Book> {
    catalog
        .get(id)
        .with_context(|| format!("No book with id '{}'", id))
}

/// Turn validation failures into a readable multi-line error
fn check(result: Result<(), CatalogError>) -> Result<()> {
    match result {
        Err(CatalogError::Validation(errors)) => {
            anyhow::bail!("Invalid input:\n{}", render::validation_report(&errors))
        }
        other => Ok(other?),
    }
}

fn run(command: CliCommand, catalog: &mut CatalogManager) -> Result<()> {
    let today = catalog.today();

    match command {
        CliCommand::List {
            query,
            sort,
            desc,
            checked_out,
            available,
            json,
        } => {
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            let filter = match (checked_out, available) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let books = catalog.filter_and_sort(
                &query,
                SortOptions::new(sort.into(), direction),
                filter,
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else if books.is_empty() {
                println!("No books found");
            } else {
                for book in &books {
                    println!("{}", render::book_line(book, today));
                }
            }
        }
        CliCommand::Show { id } => {
            let book = find_book(catalog, &BookId::from(id))?;
            println!("{}", render::book_details(book, today));
        }
        CliCommand::Add(add) => {
            let fields = add.into_new_book();
            check(validation::validate_new_book(&fields, today))?;
            let book = catalog.add_book(fields)?;
            println!("Added {}", render::book_line(&book, today));
        }
        CliCommand::Edit(edit) => {
            let id = BookId::from(edit.id.as_str());
            let edited = edit.apply(find_book(catalog, &id)?);
            check(validation::validate_book(&edited, today))?;
            catalog.update_book(edited.clone())?;
            println!("Updated {}", render::book_line(&edited, today));
        }
        CliCommand::Delete { id } => {
            let id = BookId::from(id);
            if catalog.delete_book(&id)? {
                println!("Deleted book {}", id);
            } else {
                println!("No book with id '{}'", id);
            }
        }
        CliCommand::Checkout { id, borrower, due } => {
            let id = BookId::from(id);
            let borrower = borrower.trim().to_string();
            let due = due.unwrap_or_else(|| validation::default_return_date(today));
            check(validation::validate_checkout(
                find_book(catalog, &id)?,
                &borrower,
                due,
                today,
            ))?;
            catalog.check_out_book(&id, &borrower, due)?;
            println!("Checked out to {} until {}", borrower, due);
        }
        CliCommand::Checkin { id } => {
            let id = BookId::from(id);
            let title = find_book(catalog, &id)?.title.clone();
            if catalog.check_in_book(&id)? {
                println!("Checked in '{}'", title);
            } else {
                println!("'{}' was not checked out", title);
            }
        }
        CliCommand::Overdue => {
            let overdue = catalog.overdue_books();
            if overdue.is_empty() {
                println!("No overdue books");
            }
            for book in &overdue {
                println!("{}", render::book_line(book, today));
            }
        }
        CliCommand::Stats { json } => {
            let stats = catalog.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", render::stats_report(&stats));
            }
        }
        CliCommand::Import { file } => {
            let payload = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let count = catalog.import(&payload)?;
            println!("Imported {} books", count);
        }
        CliCommand::Export { out } => match catalog.export()? {
            Some(backup) => {
                let path = backup.write_to(&out)?;
                println!("Exported library to {}", path.display());
            }
            None => println!("Nothing to export"),
        },
        CliCommand::Reset { yes } => {
            if !yes {
                anyhow::bail!(
                    "This will permanently delete all your library data. Re-run with --yes to confirm."
                );
            }
            catalog.reset()?;
            println!("Library reset to {} sample books", catalog.len());
        }
        CliCommand::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&transfer::import_schema())?
            );
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let mut catalog = config.open_manager()?;
    run(args.command, &mut catalog)
}
