//! Real-estate listing portal: REST listing/catalog service over PostgreSQL,
//! plus the client-side gateway, filter refinement and favorites store.

pub mod config;
pub mod favorites;
pub mod gateway;
pub mod listing;
pub mod models;
pub mod server;
