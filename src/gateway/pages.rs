use crate::favorites::{FavoritesStorage, FavoritesStore};
use crate::gateway::client::{Listing, PropertyClient};
use crate::gateway::refine::SearchParams;
use crate::models::BusinessType;
use tracing::info;

/// State behind a listing page (home, rentals, transfers)
#[derive(Debug, Clone)]
pub struct ListingPage {
    business: Option<BusinessType>,
    pub listings: Vec<Listing>,
    initial: Vec<Listing>,
    pub loading: bool,
}

impl ListingPage {
    pub fn new(business: Option<BusinessType>) -> Self {
        Self {
            business,
            listings: Vec::new(),
            initial: Vec::new(),
            loading: true,
        }
    }

    /// Initial load; `loading` is cleared whatever the outcome
    pub async fn load(&mut self, client: &PropertyClient) {
        self.loading = true;
        let listings = match self.business {
            Some(business) => client.list(business).await,
            None => client.list_all_public().await,
        };
        info!(
            "Loaded {} {} listings",
            listings.len(),
            self.business.map_or("public", BusinessType::label)
        );
        self.initial = listings.clone();
        self.listings = listings;
        self.loading = false;
    }

    pub async fn search(&mut self, client: &PropertyClient, params: &SearchParams) {
        self.loading = true;
        self.listings = client.search(params, self.business).await;
        self.loading = false;
    }

    /// Back to the result of the initial load, without a request
    pub fn reset(&mut self) {
        self.listings = self.initial.clone();
    }

    pub fn is_empty(&self) -> bool {
        !self.loading && self.listings.is_empty()
    }
}

/// Public listings narrowed to the favorited ids, merged at render time
#[derive(Debug, Clone)]
pub struct FavoritesPage {
    public: Vec<Listing>,
    pub listings: Vec<Listing>,
    pub loading: bool,
}

impl Default for FavoritesPage {
    fn default() -> Self {
        Self {
            public: Vec::new(),
            listings: Vec::new(),
            loading: true,
        }
    }
}

impl FavoritesPage {
    pub async fn load<S: FavoritesStorage>(
        &mut self,
        client: &PropertyClient,
        favorites: &FavoritesStore<S>,
    ) {
        self.loading = true;
        self.public = client.list_all_public().await;
        self.merge(&favorites.ids());
        self.loading = false;
    }

    /// Re-run the merge after a favorites notification
    pub fn merge(&mut self, favorite_ids: &[i32]) {
        self.listings = self
            .public
            .iter()
            .filter(|l| favorite_ids.contains(&l.property.id))
            .cloned()
            .collect();
    }
}
