use crate::listing::types::ListingFilters;
use crate::models::{Catalogos, Property, PropertyImage};
use anyhow::Result;
use async_trait::async_trait;

/// Read/update access to the property store.
/// Implemented by PostgreSQL in production and an in-memory store in demo mode.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Visible properties matching every filter, newest first, images ordered
    async fn list(&self, filters: &ListingFilters) -> Result<Vec<Property>>;

    /// A single non-deleted property
    async fn get(&self, id: i32) -> Result<Option<Property>>;

    /// Images of one property, primary first
    async fn images(&self, id: i32) -> Result<Vec<PropertyImage>>;

    /// Atomically bump the visit counter; unknown ids are ignored
    async fn increment_visits(&self, id: i32) -> Result<()>;

    /// Name of the backing store, for logs
    fn source_name(&self) -> &'static str;
}

/// Reference lists for the filter forms
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn catalogs(&self) -> Result<Catalogos>;
}
