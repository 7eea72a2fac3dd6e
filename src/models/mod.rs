pub mod catalog;
pub mod image;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use catalog::{Catalogos, CatalogEntry, Ciudad};
pub use image::{resolve_gallery, sort_images, ImageSource, PLACEHOLDER_IMAGE};

/// Business classification of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BusinessType {
    Venta,
    Renta,
    Traspaso,
}

impl BusinessType {
    pub fn id(self) -> i32 {
        match self {
            BusinessType::Venta => 1,
            BusinessType::Renta => 2,
            BusinessType::Traspaso => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(BusinessType::Venta),
            2 => Some(BusinessType::Renta),
            3 => Some(BusinessType::Traspaso),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BusinessType::Venta => "Venta",
            BusinessType::Renta => "Renta",
            BusinessType::Traspaso => "Traspaso",
        }
    }
}

/// Lifecycle status of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PublicationState {
    Publicada,
    Borrador,
    Vendida,
    Rentada,
}

impl PublicationState {
    pub fn id(self) -> i32 {
        match self {
            PublicationState::Publicada => 1,
            PublicationState::Borrador => 2,
            PublicationState::Vendida => 3,
            PublicationState::Rentada => 4,
        }
    }

    /// States hidden from every public endpoint
    pub fn hidden() -> Vec<i32> {
        [
            PublicationState::Borrador,
            PublicationState::Vendida,
            PublicationState::Rentada,
        ]
        .iter()
        .map(|s| s.id())
        .collect()
    }
}

/// One image of a property's gallery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct PropertyImage {
    pub id: i32,
    pub propiedad_id: i32,
    pub url: String,
    pub nombre_archivo: Option<String>,
    pub es_principal: bool,
    pub orden: i32,
}

/// Core property record, as served by the listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: i32,
    pub titulo: Option<String>,
    pub descripcion: Option<String>,

    pub precio: Option<f64>,
    pub precio_alquiler: Option<f64>,
    pub valor_administracion: Option<f64>,

    pub habitaciones: Option<i32>,
    pub banos: Option<i32>,
    pub estacionamientos: Option<i32>,
    pub anio_construccion: Option<i32>,
    pub piso: Option<String>,

    pub m2_terreno: Option<f64>,
    pub m2_construccion: Option<f64>,
    pub m2_privada: Option<f64>,

    pub direccion: Option<String>,
    pub codigo_postal: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,

    pub tipo_negocio_id: Option<i32>,
    pub tipo_propiedad_id: Option<i32>,
    pub estado_publicacion_id: Option<i32>,
    pub estado_id: Option<i32>,
    pub ciudad_id: Option<i32>,
    pub zona_id: Option<i32>,
    pub moneda_id: Option<i32>,

    #[serde(default)]
    pub visitas: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Gallery, primary image first then ascending `orden`
    #[serde(default)]
    pub imagenes: Vec<PropertyImage>,

    /// Deprecated single-image column (URL or base64 blob)
    #[serde(default, rename = "Imagen", skip_serializing_if = "Option::is_none")]
    pub imagen: Option<String>,
}

impl Property {
    /// Price shown on cards: sale price, falling back to the rental price
    pub fn display_price(&self) -> Option<f64> {
        self.precio.or(self.precio_alquiler)
    }

    pub fn business_type(&self) -> Option<BusinessType> {
        self.tipo_negocio_id.and_then(BusinessType::from_id)
    }

    /// "Venta" or "Renta" by business type, otherwise guessed from the prices
    pub fn business_label(&self) -> &'static str {
        match self.business_type() {
            Some(BusinessType::Venta) => "Venta",
            Some(BusinessType::Renta) => "Renta",
            _ if self.precio.is_some() => "Venta",
            _ if self.precio_alquiler.is_some() => "Renta",
            _ => "Consultar",
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Public visibility: not soft-deleted and in a non-excluded publication state
    pub fn is_visible(&self, excluded_states: &[i32]) -> bool {
        if self.is_deleted() {
            return false;
        }
        matches!(self.estado_publicacion_id, Some(state) if !excluded_states.contains(&state))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn property(id: i32) -> Property {
        Property {
            id,
            titulo: Some(format!("Casa {id}")),
            descripcion: None,
            precio: None,
            precio_alquiler: None,
            valor_administracion: None,
            habitaciones: None,
            banos: None,
            estacionamientos: None,
            anio_construccion: None,
            piso: None,
            m2_terreno: None,
            m2_construccion: None,
            m2_privada: None,
            direccion: None,
            codigo_postal: None,
            lat: None,
            lng: None,
            tipo_negocio_id: Some(1),
            tipo_propiedad_id: None,
            estado_publicacion_id: Some(1),
            estado_id: None,
            ciudad_id: None,
            zona_id: None,
            moneda_id: None,
            visitas: 0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::days(id as i64),
            deleted_at: None,
            imagenes: vec![],
            imagen: None,
        }
    }

    pub fn image(id: i32, propiedad_id: i32, es_principal: bool, orden: i32) -> PropertyImage {
        PropertyImage {
            id,
            propiedad_id,
            url: format!("https://cdn.example.com/{propiedad_id}/{id}.jpg"),
            nombre_archivo: Some(format!("{id}.jpg")),
            es_principal,
            orden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::property;
    use super::*;

    #[test]
    fn visibility_requires_live_published_state() {
        let hidden = PublicationState::hidden();

        let published = property(1);
        assert!(published.is_visible(&hidden));

        let mut draft = property(2);
        draft.estado_publicacion_id = Some(PublicationState::Borrador.id());
        assert!(!draft.is_visible(&hidden));

        let mut deleted = property(3);
        deleted.deleted_at = Some(Utc::now());
        assert!(!deleted.is_visible(&hidden));

        let mut unset = property(4);
        unset.estado_publicacion_id = None;
        assert!(!unset.is_visible(&hidden));
    }

    #[test]
    fn business_label_falls_back_to_prices() {
        let mut p = property(1);
        p.tipo_negocio_id = Some(2);
        assert_eq!(p.business_label(), "Renta");

        p.tipo_negocio_id = None;
        p.precio_alquiler = Some(9_000.0);
        assert_eq!(p.business_label(), "Renta");

        p.precio = Some(1_500_000.0);
        assert_eq!(p.business_label(), "Venta");
        assert_eq!(p.display_price(), Some(1_500_000.0));

        p.tipo_negocio_id = Some(3);
        assert_eq!(p.business_label(), "Venta");

        p.precio = None;
        p.precio_alquiler = None;
        assert_eq!(p.business_label(), "Consultar");

        p.tipo_negocio_id = None;
        assert_eq!(p.business_label(), "Consultar");
    }
}
