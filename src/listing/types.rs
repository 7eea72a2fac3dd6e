use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::Property;

/// Raw listing query string; every value is optional and parsed leniently
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    pub tipo_negocio_id: Option<String>,
    pub tipo_propiedad_id: Option<String>,
    pub precio_min: Option<String>,
    pub precio_max: Option<String>,
    pub habitaciones: Option<String>,
    pub ciudad_id: Option<String>,
    pub zona_id: Option<String>,
    pub estado_id: Option<String>,
    /// Comma-separated publication-state ids to hide
    #[serde(rename = "estado_publicacion_id__not_in")]
    pub estado_publicacion_id_not_in: Option<String>,
}

impl ListingQuery {
    /// Collect raw query pairs; the first value of a repeated key wins and
    /// unknown keys are ignored
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "tipo_negocio_id" => &mut query.tipo_negocio_id,
                "tipo_propiedad_id" => &mut query.tipo_propiedad_id,
                "precio_min" => &mut query.precio_min,
                "precio_max" => &mut query.precio_max,
                "habitaciones" => &mut query.habitaciones,
                "ciudad_id" => &mut query.ciudad_id,
                "zona_id" => &mut query.zona_id,
                "estado_id" => &mut query.estado_id,
                "estado_publicacion_id__not_in" => &mut query.estado_publicacion_id_not_in,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Inclusive price bounds; an absent bound leaves that side open
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }

    /// A listing qualifies when either its sale or its rental price is in range.
    /// Without a price it only qualifies while no bound is set.
    pub fn admits(&self, precio: Option<f64>, precio_alquiler: Option<f64>) -> bool {
        if !self.is_active() {
            return true;
        }
        [precio, precio_alquiler]
            .into_iter()
            .flatten()
            .any(|price| self.contains(price))
    }
}

/// Parsed server-side listing filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub tipo_negocio_id: Option<i32>,
    pub tipo_propiedad_id: Option<i32>,
    pub price: PriceRange,
    pub habitaciones: Option<i32>,
    pub ciudad_id: Option<i32>,
    pub zona_id: Option<i32>,
    pub estado_id: Option<i32>,
    pub excluded_states: Vec<i32>,
}

impl ListingFilters {
    /// Build filters from a raw query; malformed values are dropped, and the
    /// caller's exclusions are added on top of `default_excluded`.
    pub fn from_query(query: &ListingQuery, default_excluded: &[i32]) -> Self {
        let mut excluded_states = default_excluded.to_vec();
        if let Some(raw) = query.estado_publicacion_id_not_in.as_deref() {
            for id in parse_id_list(raw) {
                if !excluded_states.contains(&id) {
                    excluded_states.push(id);
                }
            }
        }

        Self {
            tipo_negocio_id: lenient(&query.tipo_negocio_id),
            tipo_propiedad_id: lenient(&query.tipo_propiedad_id),
            price: PriceRange {
                min: lenient::<f64>(&query.precio_min).filter(|v| v.is_finite()),
                max: lenient::<f64>(&query.precio_max).filter(|v| v.is_finite()),
            },
            habitaciones: lenient(&query.habitaciones),
            ciudad_id: lenient(&query.ciudad_id),
            zona_id: lenient(&query.zona_id),
            estado_id: lenient(&query.estado_id),
            excluded_states,
        }
    }

    /// In-process evaluation of the same predicate the SQL store applies
    pub fn matches(&self, p: &Property) -> bool {
        p.is_visible(&self.excluded_states)
            && eq_filter(self.tipo_negocio_id, p.tipo_negocio_id)
            && eq_filter(self.tipo_propiedad_id, p.tipo_propiedad_id)
            && eq_filter(self.ciudad_id, p.ciudad_id)
            && eq_filter(self.zona_id, p.zona_id)
            && eq_filter(self.estado_id, p.estado_id)
            && at_least(self.habitaciones, p.habitaciones)
            && self.price.admits(p.precio, p.precio_alquiler)
    }
}

/// Equality filter; an unset filter matches everything
pub(crate) fn eq_filter(wanted: Option<i32>, actual: Option<i32>) -> bool {
    wanted.map_or(true, |w| actual == Some(w))
}

/// Minimum filter; missing data fails once the filter is set
pub(crate) fn at_least(wanted: Option<i32>, actual: Option<i32>) -> bool {
    wanted.map_or(true, |w| actual.is_some_and(|a| a >= w))
}

fn lenient<T: FromStr>(raw: &Option<String>) -> Option<T> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Parse "2,3,4"; unparseable entries are skipped
pub fn parse_id_list(raw: &str) -> Vec<i32> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
