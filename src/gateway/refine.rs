use serde::{Deserialize, Serialize};

use crate::listing::types::{at_least, eq_filter, PriceRange};
use crate::models::Property;

/// Filters applied client-side on top of a server-filtered listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchParams {
    /// Free text matched against title or description
    pub q: Option<String>,
    pub tipo_propiedad_id: Option<i32>,
    pub estado_id: Option<i32>,
    pub ciudad_id: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Minimum number of rooms
    pub habitaciones: Option<i32>,
    /// Minimum number of bathrooms
    pub banos: Option<i32>,
    /// Minimum number of parking spots
    pub estacionamientos: Option<i32>,
}

impl SearchParams {
    pub fn price(&self) -> PriceRange {
        PriceRange {
            min: self.min_price,
            max: self.max_price,
        }
    }

    /// Number of advanced filters set (everything but text and property type)
    pub fn active_filters(&self) -> usize {
        [
            self.estado_id.is_some(),
            self.ciudad_id.is_some(),
            self.min_price.is_some(),
            self.max_price.is_some(),
            self.habitaciones.is_some(),
            self.banos.is_some(),
            self.estacionamientos.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn matches(&self, p: &Property) -> bool {
        self.matches_text(p)
            && eq_filter(self.tipo_propiedad_id, p.tipo_propiedad_id)
            && eq_filter(self.estado_id, p.estado_id)
            && eq_filter(self.ciudad_id, p.ciudad_id)
            && self.price().admits(p.precio, p.precio_alquiler)
            && at_least(self.habitaciones, p.habitaciones)
            && at_least(self.banos, p.banos)
            && at_least(self.estacionamientos, p.estacionamientos)
    }

    fn matches_text(&self, p: &Property) -> bool {
        let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        let needle = q.to_lowercase();
        [&p.titulo, &p.descripcion]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(&needle))
    }
}

/// Keep the items whose property satisfies every filter in `params`
pub fn refine<T, F>(items: Vec<T>, params: &SearchParams, property: F) -> Vec<T>
where
    F: Fn(&T) -> &Property,
{
    items.into_iter().filter(|item| params.matches(property(item))).collect()
}
