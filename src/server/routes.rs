use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use super::error::ApiError;
use super::state::AppState;
use crate::listing::{ListingFilters, ListingQuery};
use crate::models::{Catalogos, Property, PropertyImage};

/// GET /api/propiedades
pub async fn list_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let query = ListingQuery::from_pairs(pairs);
    let filters = ListingFilters::from_query(&query, &state.excluded_states);
    let properties = state
        .store
        .list(&filters)
        .await
        .map_err(ApiError::store("Error al obtener propiedades"))?;

    debug!("Listed {} properties", properties.len());
    Ok(Json(properties))
}

/// GET /api/propiedades/search
pub async fn search_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let query = ListingQuery::from_pairs(pairs);
    let filters = ListingFilters::from_query(&query, &state.excluded_states);
    let properties = state
        .store
        .list(&filters)
        .await
        .map_err(ApiError::store("Error al buscar propiedades"))?;

    debug!("Search matched {} properties", properties.len());
    Ok(Json(properties))
}

/// GET /api/propiedades/{id}
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>, ApiError> {
    let id = parse_id(&id).ok_or(ApiError::NotFound)?;

    state
        .store
        .get(id)
        .await
        .map_err(ApiError::store("Error al obtener la propiedad"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// GET /api/propiedades/{id}/imagenes
pub async fn images_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PropertyImage>>, ApiError> {
    let Some(id) = parse_id(&id) else {
        return Ok(Json(Vec::new()));
    };

    let images = state
        .store
        .images(id)
        .await
        .map_err(ApiError::store("Error al obtener las imágenes"))?;

    Ok(Json(images))
}

/// PATCH /api/propiedades/{id}/visitas
pub async fn visits_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if let Some(id) = parse_id(&id) {
        state
            .store
            .increment_visits(id)
            .await
            .map_err(ApiError::store("Error al actualizar visitas"))?;
    }

    Ok(Json(json!({ "success": true })))
}

/// GET /api/catalogos
pub async fn catalogs_handler(State(state): State<AppState>) -> Result<Json<Catalogos>, ApiError> {
    let catalogos = state
        .catalogs
        .catalogs()
        .await
        .map_err(ApiError::store("Error al obtener catálogos"))?;

    Ok(Json(catalogos))
}

pub async fn health_handler() -> &'static str {
    "ok"
}

fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}
