pub mod client;
pub mod pages;
pub mod refine;

pub use client::{Listing, PropertyClient};
pub use pages::{FavoritesPage, ListingPage};
pub use refine::SearchParams;
