use axum::{routing::get, Router};

use super::handlers::{self, BooksState};

/// Books routes, relative to the module mount point.
pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(handlers::get_books).post(handlers::add_book))
        .route(
            "/{book_id}",
            get(handlers::get_book_by_id)
                .put(handlers::update_book)
                .patch(handlers::patch_book)
                .delete(handlers::delete_book),
        )
        .with_state(state)
}
