pub mod memory;
pub mod postgres;
pub mod traits;
pub mod types;

pub use memory::MemoryStore;
pub use postgres::PgPropertyStore;
pub use traits::{CatalogStore, PropertyStore};
pub use types::{ListingFilters, ListingQuery, PriceRange};
