pub mod books;

use std::sync::Arc;

use bookstore_db::Database;
use bookstore_kernel::ModuleRegistry;

use books::store::PgBookStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database) {
    let store = PgBookStore::new(db.pool().clone());
    registry.register_custom(books::create_module(Arc::new(store)));
}
