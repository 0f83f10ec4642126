pub mod books;

use shelf_db::SharedStore;
use shelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: SharedStore) {
    registry.register_custom(books::create_module(store));
}
