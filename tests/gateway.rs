use std::sync::Arc;

use housing_portal::config::Config;
use housing_portal::favorites::{FavoritesStore, MemoryStorage};
use housing_portal::gateway::{FavoritesPage, ListingPage, PropertyClient, SearchParams};
use housing_portal::listing::MemoryStore;
use housing_portal::models::{BusinessType, PLACEHOLDER_IMAGE};
use housing_portal::server::{self, AppState};
use tokio::net::TcpListener;

/// Serve the demo listings on an ephemeral port and point a client at it
async fn spawn_demo() -> (PropertyClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_demo_listings());
    let state = AppState::new(store.clone(), store.clone(), &Config::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));

    let client = PropertyClient::new(format!("http://{address}/api")).unwrap();
    (client, store)
}

#[tokio::test]
async fn lists_are_split_by_business_type() {
    let (client, _) = spawn_demo().await;

    let rentals = client.list(BusinessType::Renta).await;
    assert!(!rentals.is_empty());
    assert!(rentals.iter().all(|l| l.property.tipo_negocio_id == Some(2)));

    let all = client.list_all_public().await;
    assert!(all.len() > rentals.len());
    assert!(all.iter().all(|l| !l.gallery.is_empty()));
}

#[tokio::test]
async fn search_refines_the_server_listing() {
    let (client, _) = spawn_demo().await;

    let params = SearchParams {
        habitaciones: Some(3),
        ..Default::default()
    };
    let results = client.search(&params, Some(BusinessType::Venta)).await;

    assert!(!results.is_empty());
    assert!(results
        .iter()
        .all(|l| l.property.habitaciones.unwrap_or(0) >= 3 && l.property.tipo_negocio_id == Some(1)));
}

#[tokio::test]
async fn detail_images_and_visits_round_trip() {
    let (client, store) = spawn_demo().await;

    let listing = client.get(1).await.expect("demo property 1");
    assert_ne!(listing.cover(), PLACEHOLDER_IMAGE);
    assert_eq!(client.images(1).await.len(), 1);

    assert!(client.increment_views(1).await);
    assert!(client.increment_views(1).await);
    assert_eq!(store.snapshot(1).await.unwrap().visitas, 2);

    assert!(client.get(999_999).await.is_none());
}

#[tokio::test]
async fn catalogs_feed_the_city_dropdown() {
    let (client, _) = spawn_demo().await;

    let catalogos = client.catalogs().await;
    assert!(!catalogos.tipos_propiedad.is_empty());

    let cities = client.cities_in_state(28).await;
    assert!(cities.iter().all(|c| c.estado_id == 28));
    assert!(!cities.is_empty());
}

#[tokio::test]
async fn listing_page_search_and_reset() {
    let (client, _) = spawn_demo().await;
    let mut page = ListingPage::new(Some(BusinessType::Venta));

    page.load(&client).await;
    assert!(!page.loading);
    let initial = page.listings.len();
    assert!(initial > 1);

    let params = SearchParams {
        q: Some("san pedro".into()),
        ..Default::default()
    };
    page.search(&client, &params).await;
    assert_eq!(page.listings.len(), 1);

    page.reset();
    assert_eq!(page.listings.len(), initial);
}

#[tokio::test]
async fn unreachable_service_clears_loading_with_empty_page() {
    let client = PropertyClient::new("http://127.0.0.1:9/api").unwrap();
    let mut page = ListingPage::new(None);

    page.load(&client).await;
    assert!(!page.loading);
    assert!(page.is_empty());
}

#[tokio::test]
async fn favorites_page_follows_toggles() {
    let (client, _) = spawn_demo().await;
    let mut favorites = FavoritesStore::load(MemoryStorage::default());
    favorites.toggle(2).unwrap();

    let mut page = FavoritesPage::default();
    page.load(&client, &favorites).await;
    let ids: Vec<i32> = page.listings.iter().map(|l| l.property.id).collect();
    assert_eq!(ids, vec![2]);

    let mut updates = favorites.subscribe();
    favorites.toggle(5).unwrap();
    favorites.toggle(2).unwrap();
    page.merge(&updates.borrow_and_update());

    let ids: Vec<i32> = page.listings.iter().map(|l| l.property.id).collect();
    assert_eq!(ids, vec![5]);
}
