use crate::listing::traits::{CatalogStore, PropertyStore};
use crate::listing::types::ListingFilters;
use crate::models::{
    sort_images, BusinessType, CatalogEntry, Catalogos, Ciudad, Property, PropertyImage,
    PublicationState,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;

/// In-process store holding properties and catalogs behind a lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    properties: RwLock<Vec<Property>>,
    catalogs: Catalogos,
}

impl MemoryStore {
    pub fn new(properties: Vec<Property>, catalogs: Catalogos) -> Self {
        Self {
            properties: RwLock::new(properties),
            catalogs,
        }
    }

    /// Seeded store used when no database is configured
    pub fn with_demo_listings() -> Self {
        info!("📋 Seeding demo listings");
        Self::new(demo_properties(), demo_catalogs())
    }

    /// Remove a property; its images go with it
    pub async fn remove(&self, id: i32) -> bool {
        let mut properties = self.properties.write().await;
        let before = properties.len();
        properties.retain(|p| p.id != id);
        properties.len() != before
    }

    /// Raw stored record, including soft-deleted ones
    pub async fn snapshot(&self, id: i32) -> Option<Property> {
        self.properties.read().await.iter().find(|p| p.id == id).cloned()
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn list(&self, filters: &ListingFilters) -> Result<Vec<Property>> {
        let mut matching: Vec<Property> = self
            .properties
            .read()
            .await
            .iter()
            .filter(|p| filters.matches(p))
            .cloned()
            .map(with_sorted_images)
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn get(&self, id: i32) -> Result<Option<Property>> {
        Ok(self
            .properties
            .read()
            .await
            .iter()
            .find(|p| p.id == id && !p.is_deleted())
            .cloned()
            .map(with_sorted_images))
    }

    async fn images(&self, id: i32) -> Result<Vec<PropertyImage>> {
        Ok(self
            .properties
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .map(|p| with_sorted_images(p.clone()).imagenes)
            .unwrap_or_default())
    }

    async fn increment_visits(&self, id: i32) -> Result<()> {
        // The write lock makes the bump a single step
        if let Some(p) = self.properties.write().await.iter_mut().find(|p| p.id == id) {
            p.visitas += 1;
        }
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn catalogs(&self) -> Result<Catalogos> {
        Ok(self.catalogs.clone())
    }
}

fn with_sorted_images(mut property: Property) -> Property {
    sort_images(&mut property.imagenes);
    property
}

fn entry(id: i32, nombre: &str) -> CatalogEntry {
    CatalogEntry {
        id,
        nombre: nombre.to_string(),
    }
}

fn demo_catalogs() -> Catalogos {
    Catalogos {
        tipos_propiedad: vec![entry(1, "Casa"), entry(2, "Departamento"), entry(3, "Local comercial")],
        estados: vec![entry(19, "Nuevo León"), entry(28, "Tamaulipas")],
        ciudades: vec![
            Ciudad { id: 1, nombre: "Monterrey".into(), estado_id: 19 },
            Ciudad { id: 2, nombre: "San Pedro Garza García".into(), estado_id: 19 },
            Ciudad { id: 3, nombre: "Tampico".into(), estado_id: 28 },
        ],
        tipos_negocio: vec![entry(1, "Venta"), entry(2, "Renta"), entry(3, "Traspaso")],
        estados_publicacion: vec![
            entry(1, "Publicada"),
            entry(2, "En Borrador"),
            entry(3, "Vendida"),
            entry(4, "Rentada"),
        ],
        estados_fisicos: vec![entry(1, "Nuevo"), entry(2, "Usado")],
        monedas: vec![entry(1, "MXN"), entry(2, "USD")],
        frecuencias_alquiler: vec![entry(1, "Mensual"), entry(2, "Anual")],
        zonas: vec![entry(1, "Centro"), entry(2, "Valle Oriente")],
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_property(
    id: i32,
    titulo: &str,
    business: BusinessType,
    price: f64,
    habitaciones: i32,
    banos: i32,
    ciudad_id: i32,
    days_old: i64,
) -> Property {
    let (precio, precio_alquiler) = match business {
        BusinessType::Renta => (None, Some(price)),
        _ => (Some(price), None),
    };

    Property {
        id,
        titulo: Some(titulo.to_string()),
        descripcion: Some(format!("{titulo}. {habitaciones} recámaras, {banos} baños.")),
        precio,
        precio_alquiler,
        valor_administracion: None,
        habitaciones: Some(habitaciones),
        banos: Some(banos),
        estacionamientos: Some(1),
        anio_construccion: None,
        piso: None,
        m2_terreno: Some(160.0),
        m2_construccion: Some(120.0),
        m2_privada: None,
        direccion: None,
        codigo_postal: None,
        lat: Some("25.6866".to_string()),
        lng: Some("-100.3161".to_string()),
        tipo_negocio_id: Some(business.id()),
        tipo_propiedad_id: Some(1),
        estado_publicacion_id: Some(PublicationState::Publicada.id()),
        estado_id: Some(if ciudad_id == 3 { 28 } else { 19 }),
        ciudad_id: Some(ciudad_id),
        zona_id: Some(1),
        moneda_id: Some(1),
        visitas: 0,
        created_at: Utc::now() - Duration::days(days_old),
        deleted_at: None,
        imagenes: vec![PropertyImage {
            id: id * 10,
            propiedad_id: id,
            url: format!("https://images.example.com/propiedades/{id}/portada.jpg"),
            nombre_archivo: Some("portada.jpg".to_string()),
            es_principal: true,
            orden: 0,
        }],
        imagen: None,
    }
}

fn demo_properties() -> Vec<Property> {
    vec![
        demo_property(1, "Casa en Cumbres", BusinessType::Venta, 3_250_000.0, 3, 2, 1, 3),
        demo_property(2, "Departamento en Valle Oriente", BusinessType::Renta, 18_500.0, 2, 2, 2, 5),
        demo_property(3, "Casa frente a la Laguna del Carpintero", BusinessType::Venta, 2_100_000.0, 2, 1, 3, 9),
        demo_property(4, "Local en el Centro", BusinessType::Traspaso, 450_000.0, 0, 1, 1, 12),
        demo_property(5, "Residencia en San Pedro", BusinessType::Venta, 9_800_000.0, 4, 4, 2, 20),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::types::PriceRange;
    use crate::models::fixtures::{image, property};
    use std::sync::Arc;

    #[tokio::test]
    async fn soft_deleted_and_hidden_states_never_listed() {
        let mut deleted = property(1);
        deleted.deleted_at = Some(Utc::now());
        let mut sold = property(2);
        sold.estado_publicacion_id = Some(PublicationState::Vendida.id());
        let live = property(3);

        let store = MemoryStore::new(vec![deleted, sold, live], Catalogos::default());
        let filters = ListingFilters {
            excluded_states: PublicationState::hidden(),
            ..Default::default()
        };

        let ids: Vec<i32> = store.list(&filters).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);
        assert!(store.get(1).await.unwrap().is_none());
        assert!(store.get(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn listing_is_newest_first_with_ordered_images() {
        let mut older = property(1);
        older.imagenes = vec![image(1, 1, false, 1), image(2, 1, true, 3), image(3, 1, false, 0)];
        let newer = property(2);

        let store = MemoryStore::new(vec![older, newer], Catalogos::default());
        let listed = store.list(&ListingFilters::default()).await.unwrap();

        assert_eq!(listed[0].id, 2);
        let order: Vec<i32> = listed[1].imagenes.iter().map(|i| i.id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        let images: Vec<i32> = store.images(1).await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(images, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn price_filter_scenario() {
        let mut cheap = property(1);
        cheap.precio = Some(50_000.0);
        let mut rental = property(2);
        rental.tipo_negocio_id = Some(2);
        rental.precio_alquiler = Some(150_000.0);
        let mut sale = property(3);
        sale.precio = Some(100_000.0);
        let unpriced = property(4);

        let store = MemoryStore::new(vec![cheap, rental, sale, unpriced], Catalogos::default());
        let filters = ListingFilters {
            tipo_negocio_id: Some(1),
            price: PriceRange { min: Some(100_000.0), max: None },
            ..Default::default()
        };

        let ids: Vec<i32> = store.list(&filters).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn concurrent_visits_are_not_lost() {
        let store = Arc::new(MemoryStore::new(vec![property(1)], Catalogos::default()));

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment_visits(1).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.snapshot(1).await.unwrap().visitas, 50);
        // unknown ids are a silent no-op
        store.increment_visits(999).await.unwrap();
    }

    #[tokio::test]
    async fn demo_store_lists_every_business_type() {
        let store = MemoryStore::with_demo_listings();
        for business in [BusinessType::Venta, BusinessType::Renta, BusinessType::Traspaso] {
            let filters = ListingFilters {
                tipo_negocio_id: Some(business.id()),
                excluded_states: PublicationState::hidden(),
                ..Default::default()
            };
            assert!(!store.list(&filters).await.unwrap().is_empty());
        }
        assert_eq!(store.catalogs().await.unwrap().cities_in_state(19).len(), 2);
    }
}
