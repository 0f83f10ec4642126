//! Book persistence for shelf.
//!
//! [`BookStore`] is the contract the HTTP handlers program against. Two
//! backends implement it: [`MongoStore`] for deployments and [`MemoryStore`]
//! for tests and throwaway runs. [`connect`] picks one from settings.

pub mod error;
pub mod memory;
pub mod model;
pub mod module;
pub mod mongo;
pub mod store;

use std::sync::Arc;

use shelf_kernel::settings::{DatabaseBackend, DatabaseSettings};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use model::{
    Book, BookChanges, BookFilter, BookId, BookPatch, BookReplacement, NewBook, Pagination,
};
pub use module::DatabaseModule;
pub use mongo::MongoStore;
pub use store::{BookStore, SharedStore};

/// Open the configured store. Called once at process start; the returned
/// handle is shared by every request.
pub async fn connect(settings: &DatabaseSettings) -> StoreResult<SharedStore> {
    match settings.backend {
        DatabaseBackend::MongoDb => {
            let store = MongoStore::connect(settings).await?;
            Ok(Arc::new(store))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("using in-memory book store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
