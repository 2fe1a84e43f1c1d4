use bookshelf_core::catalog::{
    validation, CatalogManager, FixedClock, NewBook, SortDirection, SortField, SortOptions,
    STORAGE_KEY,
};
use bookshelf_core::state::{FileStore, KeyValueStore, SqliteStore};
use bookshelf_core::CatalogError;
use chrono::NaiveDate;
use std::sync::Arc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

fn open(store: Arc<dyn KeyValueStore>) -> CatalogManager {
    CatalogManager::load_with(store, STORAGE_KEY, Arc::new(FixedClock(today())))
}

fn new_book(title: &str, author: &str, year: i32, genre: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        publish_year: Some(year),
        genre: Some(genre.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_lending_workflow_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookshelf.db");

    let dune_id = {
        let mut catalog = open(Arc::new(SqliteStore::open_at(&path).unwrap()));
        assert_eq!(catalog.len(), 3);

        let fields = new_book("Dune", "Frank Herbert", 1965, "Science Fiction");
        validation::validate_new_book(&fields, today()).unwrap();
        let dune = catalog.add_book(fields).unwrap();

        let due = validation::default_return_date(today());
        validation::validate_checkout(&dune, "Maya", due, today()).unwrap();
        assert!(catalog.check_out_book(&dune.id, "Maya", due).unwrap());
        dune.id
    };

    let mut catalog = open(Arc::new(SqliteStore::open_at(&path).unwrap()));
    assert_eq!(catalog.len(), 4);

    let dune = catalog.get(&dune_id).unwrap().clone();
    let loan = dune.loan.as_ref().unwrap();
    assert_eq!(loan.borrower, "Maya");
    assert_eq!(loan.return_date, NaiveDate::from_ymd_opt(2024, 9, 16).unwrap());

    // A second checkout is refused at the input boundary
    assert!(matches!(
        validation::validate_checkout(&dune, "Leo", today(), today()),
        Err(CatalogError::Validation(_))
    ));

    let on_loan = catalog.filter_and_sort(
        "",
        SortOptions::new(SortField::PublishYear, SortDirection::Desc),
        Some(true),
    );
    let titles: Vec<&str> = on_loan.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "1984"]);

    assert!(catalog.check_in_book(&dune_id).unwrap());
    let stats = catalog.stats();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.checked_out, 1);
    assert_eq!(stats.available, 3);
    assert_eq!(stats.top_genres(1), vec![("Classic".to_string(), 2)]);
}

#[test]
fn test_backup_moves_between_backends() {
    let dir = tempfile::tempdir().unwrap();

    let mut source = open(Arc::new(SqliteStore::open_in_memory().unwrap()));
    source
        .add_book(new_book("Beloved", "Toni Morrison", 1987, "Literary Fiction"))
        .unwrap();
    let backup = source.export().unwrap().unwrap();
    let written = backup.write_to(dir.path()).unwrap();
    assert!(written.ends_with("library-export-2024-09-02.json"));

    let payload = std::fs::read_to_string(&written).unwrap();
    let file_store = Arc::new(FileStore::new(dir.path().join("data")));
    let mut target = open(file_store.clone());
    target.import(&payload).unwrap();

    assert_eq!(target.books(), source.books());
    assert_eq!(file_store.get(STORAGE_KEY).unwrap().unwrap(), payload);

    // A bad backup leaves the target untouched
    let before = target.books().to_vec();
    assert!(target.import(r#"[{"title":"no id"}]"#).is_err());
    assert_eq!(target.books(), before.as_slice());
}
