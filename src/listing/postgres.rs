use crate::listing::traits::{CatalogStore, PropertyStore};
use crate::listing::types::{ListingFilters, PriceRange};
use crate::models::{sort_images, CatalogEntry, Catalogos, Ciudad, Property, PropertyImage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

/// Property columns plus the image collection aggregated in display order
const SELECT_PROPERTIES: &str = r#"
    SELECT
        p.id::int4 AS id,
        p.titulo,
        p.descripcion,
        p.precio::float8 AS precio,
        p.precio_alquiler::float8 AS precio_alquiler,
        p.valor_administracion::float8 AS valor_administracion,
        p.habitaciones::int4 AS habitaciones,
        p.banos::int4 AS banos,
        p.estacionamientos::int4 AS estacionamientos,
        p.anio_construccion::int4 AS anio_construccion,
        p.piso::text AS piso,
        p.m2_terreno::float8 AS m2_terreno,
        p.m2_construccion::float8 AS m2_construccion,
        p.m2_privada::float8 AS m2_privada,
        p.direccion,
        p.codigo_postal::text AS codigo_postal,
        p.lat::text AS lat,
        p.lng::text AS lng,
        p.tipo_negocio_id::int4 AS tipo_negocio_id,
        p.tipo_propiedad_id::int4 AS tipo_propiedad_id,
        p.estado_publicacion_id::int4 AS estado_publicacion_id,
        p.estado_id::int4 AS estado_id,
        p.ciudad_id::int4 AS ciudad_id,
        p.zona_id::int4 AS zona_id,
        p.moneda_id::int4 AS moneda_id,
        COALESCE(p.visitas, 0)::int4 AS visitas,
        p.created_at::timestamptz AS created_at,
        p.deleted_at::timestamptz AS deleted_at,
        COALESCE(
            json_agg(
                json_build_object(
                    'id', pi.id,
                    'propiedad_id', pi.propiedad_id,
                    'url', pi.url,
                    'nombre_archivo', pi.nombre_archivo,
                    'es_principal', COALESCE(pi.es_principal, false),
                    'orden', COALESCE(pi.orden, 0)
                ) ORDER BY pi.es_principal DESC NULLS LAST, pi.orden ASC
            ) FILTER (WHERE pi.id IS NOT NULL),
            '[]'
        ) AS imagenes
    FROM propiedades p
    LEFT JOIN propiedades_imagenes pi ON p.id = pi.propiedad_id
    WHERE p.deleted_at IS NULL
"#;

const GROUP_AND_ORDER: &str = " GROUP BY p.id ORDER BY p.created_at DESC";

#[derive(Debug, sqlx::FromRow)]
struct PropertyRow {
    id: i32,
    titulo: Option<String>,
    descripcion: Option<String>,
    precio: Option<f64>,
    precio_alquiler: Option<f64>,
    valor_administracion: Option<f64>,
    habitaciones: Option<i32>,
    banos: Option<i32>,
    estacionamientos: Option<i32>,
    anio_construccion: Option<i32>,
    piso: Option<String>,
    m2_terreno: Option<f64>,
    m2_construccion: Option<f64>,
    m2_privada: Option<f64>,
    direccion: Option<String>,
    codigo_postal: Option<String>,
    lat: Option<String>,
    lng: Option<String>,
    tipo_negocio_id: Option<i32>,
    tipo_propiedad_id: Option<i32>,
    estado_publicacion_id: Option<i32>,
    estado_id: Option<i32>,
    ciudad_id: Option<i32>,
    zona_id: Option<i32>,
    moneda_id: Option<i32>,
    visitas: i32,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    imagenes: Json<Vec<PropertyImage>>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        let mut imagenes = row.imagenes.0;
        sort_images(&mut imagenes);

        Property {
            id: row.id,
            titulo: row.titulo,
            descripcion: row.descripcion,
            precio: row.precio,
            precio_alquiler: row.precio_alquiler,
            valor_administracion: row.valor_administracion,
            habitaciones: row.habitaciones,
            banos: row.banos,
            estacionamientos: row.estacionamientos,
            anio_construccion: row.anio_construccion,
            piso: row.piso,
            m2_terreno: row.m2_terreno,
            m2_construccion: row.m2_construccion,
            m2_privada: row.m2_privada,
            direccion: row.direccion,
            codigo_postal: row.codigo_postal,
            lat: row.lat,
            lng: row.lng,
            tipo_negocio_id: row.tipo_negocio_id,
            tipo_propiedad_id: row.tipo_propiedad_id,
            estado_publicacion_id: row.estado_publicacion_id,
            estado_id: row.estado_id,
            ciudad_id: row.ciudad_id,
            zona_id: row.zona_id,
            moneda_id: row.moneda_id,
            visitas: row.visitas,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
            imagenes,
            imagen: None,
        }
    }
}

/// PostgreSQL-backed property and catalog store
#[derive(Clone, Debug)]
pub struct PgPropertyStore {
    pool: PgPool,
}

impl PgPropertyStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self::new(pool))
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Migration failed")?;
        Ok(())
    }

    /// Append the WHERE clauses for `filters` to a query started from SELECT_PROPERTIES
    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &ListingFilters) {
        // A NULL publication state never passes `<> ALL`, so unset counts as hidden
        builder.push(" AND p.estado_publicacion_id IS NOT NULL");
        if !filters.excluded_states.is_empty() {
            builder.push(" AND p.estado_publicacion_id <> ALL(");
            builder.push_bind(filters.excluded_states.clone());
            builder.push(")");
        }

        let equalities = [
            ("p.tipo_negocio_id", filters.tipo_negocio_id),
            ("p.tipo_propiedad_id", filters.tipo_propiedad_id),
            ("p.ciudad_id", filters.ciudad_id),
            ("p.zona_id", filters.zona_id),
            ("p.estado_id", filters.estado_id),
        ];
        for (column, value) in equalities {
            if let Some(value) = value {
                builder.push(format!(" AND {column} = "));
                builder.push_bind(value);
            }
        }

        if let Some(rooms) = filters.habitaciones {
            builder.push(" AND p.habitaciones >= ");
            builder.push_bind(rooms);
        }

        if filters.price.is_active() {
            builder.push(" AND (");
            Self::push_price_column(builder, "p.precio", &filters.price);
            builder.push(" OR ");
            Self::push_price_column(builder, "p.precio_alquiler", &filters.price);
            builder.push(")");
        }
    }

    fn push_price_column(builder: &mut QueryBuilder<'_, Postgres>, column: &str, range: &PriceRange) {
        builder.push(format!("({column} IS NOT NULL"));
        if let Some(min) = range.min {
            builder.push(format!(" AND {column}::float8 >= "));
            builder.push_bind(min);
        }
        if let Some(max) = range.max {
            builder.push(format!(" AND {column}::float8 <= "));
            builder.push_bind(max);
        }
        builder.push(")");
    }

    async fn catalog_table(&self, table: &'static str) -> Result<Vec<CatalogEntry>> {
        let sql = format!("SELECT id::int4 AS id, nombre FROM {table} ORDER BY nombre");
        sqlx::query_as::<_, CatalogEntry>(&sql)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to load catalog {table}"))
    }
}

#[async_trait]
impl PropertyStore for PgPropertyStore {
    async fn list(&self, filters: &ListingFilters) -> Result<Vec<Property>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_PROPERTIES);
        Self::push_filters(&mut builder, filters);
        builder.push(GROUP_AND_ORDER);

        debug!("Listing properties with {:?}", filters);

        let rows = builder
            .build_query_as::<PropertyRow>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list properties")?;

        Ok(rows.into_iter().map(Property::from).collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Property>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_PROPERTIES);
        builder.push(" AND p.id = ");
        builder.push_bind(id);
        builder.push(" GROUP BY p.id");

        let row = builder
            .build_query_as::<PropertyRow>()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch property {id}"))?;

        Ok(row.map(Property::from))
    }

    async fn images(&self, id: i32) -> Result<Vec<PropertyImage>> {
        sqlx::query_as::<_, PropertyImage>(
            r#"
            SELECT
                id::int4 AS id,
                propiedad_id::int4 AS propiedad_id,
                url,
                nombre_archivo,
                COALESCE(es_principal, false) AS es_principal,
                COALESCE(orden, 0)::int4 AS orden
            FROM propiedades_imagenes
            WHERE propiedad_id = $1
            ORDER BY es_principal DESC NULLS LAST, orden ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch images of property {id}"))
    }

    async fn increment_visits(&self, id: i32) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE propiedades
            SET visitas = COALESCE(visitas, 0) + 1
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to increment visits of property {id}"))?;

        debug!("Visit counter bump on {id} touched {} row(s)", result.rows_affected());
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "PostgreSQL"
    }
}

#[async_trait]
impl CatalogStore for PgPropertyStore {
    async fn catalogs(&self) -> Result<Catalogos> {
        let ciudades = sqlx::query_as::<_, Ciudad>(
            "SELECT id::int4 AS id, nombre, estado_id::int4 AS estado_id FROM ciudades ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load catalog ciudades")?;

        Ok(Catalogos {
            tipos_propiedad: self.catalog_table("tipos_propiedad").await?,
            estados: self.catalog_table("estados").await?,
            ciudades,
            tipos_negocio: self.catalog_table("tipos_negocio").await?,
            estados_publicacion: self.catalog_table("estados_publicacion").await?,
            estados_fisicos: self.catalog_table("estados_fisicos").await?,
            monedas: self.catalog_table("monedas").await?,
            frecuencias_alquiler: self.catalog_table("frecuencias_alquiler").await?,
            zonas: self.catalog_table("zonas").await?,
        })
    }
}
