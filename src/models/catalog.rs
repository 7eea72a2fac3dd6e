use serde::{Deserialize, Serialize};

/// Generic reference-table row (property type, state, zone, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct CatalogEntry {
    pub id: i32,
    pub nombre: String,
}

/// A city always belongs to a state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Ciudad {
    pub id: i32,
    pub nombre: String,
    pub estado_id: i32,
}

/// Every reference list used to populate the filter dropdowns
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Catalogos {
    pub tipos_propiedad: Vec<CatalogEntry>,
    pub estados: Vec<CatalogEntry>,
    pub ciudades: Vec<Ciudad>,
    pub tipos_negocio: Vec<CatalogEntry>,
    pub estados_publicacion: Vec<CatalogEntry>,
    pub estados_fisicos: Vec<CatalogEntry>,
    pub monedas: Vec<CatalogEntry>,
    pub frecuencias_alquiler: Vec<CatalogEntry>,
    pub zonas: Vec<CatalogEntry>,
}

impl Catalogos {
    /// Cities whose parent state is `estado_id`
    pub fn cities_in_state(&self, estado_id: i32) -> Vec<Ciudad> {
        self.ciudades
            .iter()
            .filter(|c| c.estado_id == estado_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cities_are_filtered_by_parent_state() {
        let catalogos = Catalogos {
            ciudades: vec![
                Ciudad { id: 1, nombre: "Monterrey".into(), estado_id: 19 },
                Ciudad { id: 2, nombre: "Tampico".into(), estado_id: 28 },
                Ciudad { id: 3, nombre: "San Pedro".into(), estado_id: 19 },
            ],
            ..Default::default()
        };

        let ids: Vec<i32> = catalogos.cities_in_state(19).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(catalogos.cities_in_state(1).is_empty());
    }

    #[test]
    fn missing_lists_deserialize_empty() {
        let catalogos: Catalogos =
            serde_json::from_str(r#"{"estados":[{"id":1,"nombre":"Nuevo León"}]}"#).unwrap();
        assert_eq!(catalogos.estados.len(), 1);
        assert!(catalogos.tipos_propiedad.is_empty());
    }
}
