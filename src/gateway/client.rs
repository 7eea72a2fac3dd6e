use crate::gateway::refine::{refine, SearchParams};
use crate::models::{resolve_gallery, BusinessType, Catalogos, Ciudad, Property, PropertyImage, PublicationState};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// A property resolved for display, with its gallery computed once
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub property: Property,
    /// Never empty; falls back to the placeholder image
    pub gallery: Vec<String>,
}

impl Listing {
    pub fn new(property: Property) -> Self {
        let gallery = resolve_gallery(&property);
        Self { property, gallery }
    }

    pub fn cover(&self) -> &str {
        self.gallery.first().map(String::as_str).unwrap_or_default()
    }
}

/// HTTP gateway to the listing and catalog endpoints.
/// Failures are logged and degrade to empty results.
#[derive(Debug, Clone)]
pub struct PropertyClient {
    client: Client,
    base_url: String,
    excluded_states: String,
}

impl PropertyClient {
    /// Gateway against `base_url`, e.g. `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let excluded_states = PublicationState::hidden()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            excluded_states,
        })
    }

    /// Public listings of one business type (sale, rental, transfer)
    pub async fn list(&self, business: BusinessType) -> Vec<Listing> {
        self.list_filtered(Some(business)).await
    }

    /// Every public listing regardless of business type
    pub async fn list_all_public(&self) -> Vec<Listing> {
        self.list_filtered(None).await
    }

    /// Server listing refined client-side by `params`
    pub async fn search(&self, params: &SearchParams, business: Option<BusinessType>) -> Vec<Listing> {
        let base = self.list_filtered(business).await;
        refine(base, params, |listing| &listing.property)
    }

    pub async fn get(&self, id: i32) -> Option<Listing> {
        let url = format!("{}/propiedades/{id}", self.base_url);
        match self.fetch_json::<Property>(&url, &[]).await {
            Ok(property) => Some(Listing::new(property)),
            Err(e) => {
                warn!("Could not load property {id}: {e:#}");
                None
            }
        }
    }

    pub async fn images(&self, id: i32) -> Vec<PropertyImage> {
        let url = format!("{}/propiedades/{id}/imagenes", self.base_url);
        self.fetch_json(&url, &[]).await.unwrap_or_else(|e| {
            warn!("Could not load images of property {id}: {e:#}");
            Vec::new()
        })
    }

    /// Bump the visit counter; returns whether the server acknowledged it
    pub async fn increment_views(&self, id: i32) -> bool {
        let url = format!("{}/propiedades/{id}/visitas", self.base_url);
        let result = async {
            self.client
                .patch(&url)
                .send()
                .await
                .context("Request failed")?
                .error_for_status()
                .context("Server rejected visit")?;
            anyhow::Ok(())
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not increment views of property {id}: {e:#}");
                false
            }
        }
    }

    pub async fn catalogs(&self) -> Catalogos {
        let url = format!("{}/catalogos", self.base_url);
        self.fetch_json(&url, &[]).await.unwrap_or_else(|e| {
            warn!("Could not load catalogs: {e:#}");
            Catalogos::default()
        })
    }

    pub async fn cities_in_state(&self, estado_id: i32) -> Vec<Ciudad> {
        self.catalogs().await.cities_in_state(estado_id)
    }

    async fn list_filtered(&self, business: Option<BusinessType>) -> Vec<Listing> {
        let url = format!("{}/propiedades", self.base_url);
        let mut query = vec![(
            "estado_publicacion_id__not_in",
            self.excluded_states.clone(),
        )];
        if let Some(business) = business {
            query.push(("tipo_negocio_id", business.id().to_string()));
        }

        match self.fetch_json::<Vec<Property>>(&url, &query).await {
            Ok(properties) => {
                debug!("Fetched {} properties", properties.len());
                properties.into_iter().map(Listing::new).collect()
            }
            Err(e) => {
                warn!("Could not reach the listing service: {e:#}");
                Vec::new()
            }
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("{url} returned status {}", response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to decode {url}"))
    }
}
