use shelf_db::NewBook;

/// Sample records loaded by `shelf seed`.
pub fn sample_books() -> Vec<NewBook> {
    vec![
        NewBook::new("Book One", "Author A")
            .with_genre("Fiction")
            .with_read(true),
        NewBook::new("Book Two", "Author B")
            .with_genre("Non-Fiction")
            .with_read(true),
    ]
}
