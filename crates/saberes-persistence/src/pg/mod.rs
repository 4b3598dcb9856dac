//! Implementación Postgres (Diesel) del gateway de persistencia del core.
//!
//! - Una fila de `spaces` por espacio: columnas escalares para los textos y
//!   la calificación, JSONB para listas y filas anidadas.
//! - `update` lee la fila con `FOR UPDATE`, aplica el parche en Rust y
//!   escribe el registro completo dentro de una transacción read-write.
//! - Errores transitorios: reintento con backoff en todas las operaciones.
//! - El mapeo filas ↔ dominio queda aislado aquí; el core sólo ve
//!   `GatewayError`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use saberes_core::{DraftRecord, GatewayError, PersistenceGateway, SpaceOrder};
use saberes_domain::{NewSpace, Space, SpaceFields, MAX_RATING};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::spaces;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// El pool se construye con `min_idle` y `max_size`; al construirlo se
/// corren las migraciones pendientes (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real o simularlo en tests sin acoplar a r2d2.
/// Debe devolver una conexión válida o `PersistenceError::TransientIo`.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool.get().map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila completa de `spaces`.
#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = spaces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SpaceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub visit_date: String,
    pub address: String,
    pub contact: String,
    pub email: String,
    pub description: String,
    pub media_urls: Value,
    pub rating: i16,
    pub access_tags: Value,
    pub theme_tags: Value,
    pub disciplines: Value,
    pub main_theme: String,
    pub other_themes: Value,
    pub interdisciplinary_associations: Value,
    pub additional_info: String,
    pub inclusion_tags: Value,
    pub additional_inclusion: Value,
    pub digital_technologies: Value,
    pub didactic_strategies: Value,
    pub technology_relationships: Value,
    pub technology_developments: Value,
    pub contents: Value,
    pub objectives: Value,
    pub methodologies: Value,
    pub evaluations: Value,
    pub learning_objective: String,
    pub general_methodology: String,
    pub society_relationship: String,
    pub teacher_contribution: String,
    pub recommended_references: String,
    pub review_count: Option<i32>,
    pub kind: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columnas editables por el formulario (inserción y actualización).
#[derive(Insertable, AsChangeset, Debug)]
#[diesel(table_name = spaces)]
pub struct SpaceColumns<'a> {
    pub name: &'a str,
    pub visit_date: &'a str,
    pub address: &'a str,
    pub contact: &'a str,
    pub email: &'a str,
    pub description: &'a str,
    pub media_urls: Value,
    pub rating: i16,
    pub access_tags: Value,
    pub theme_tags: Value,
    pub disciplines: Value,
    pub main_theme: &'a str,
    pub other_themes: Value,
    pub interdisciplinary_associations: Value,
    pub additional_info: &'a str,
    pub inclusion_tags: Value,
    pub additional_inclusion: Value,
    pub digital_technologies: Value,
    pub didactic_strategies: Value,
    pub technology_relationships: Value,
    pub technology_developments: Value,
    pub contents: Value,
    pub objectives: Value,
    pub methodologies: Value,
    pub evaluations: Value,
    pub learning_objective: &'a str,
    pub general_methodology: &'a str,
    pub society_relationship: &'a str,
    pub teacher_contribution: &'a str,
    pub recommended_references: &'a str,
}

fn to_jsonb<T: Serialize>(value: &T) -> Result<Value, PersistenceError> {
    Ok(serde_json::to_value(value)?)
}

/// JSONB nulo se lee como valor vacío (filas antiguas).
fn from_jsonb<T: DeserializeOwned + Default>(column: &str, value: Value) -> Result<T, PersistenceError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| PersistenceError::InvalidRow(format!("{column}: {e}")))
}

impl<'a> SpaceColumns<'a> {
    pub fn from_fields(f: &'a SpaceFields) -> Result<Self, PersistenceError> {
        Ok(Self { name: &f.name,
                  visit_date: &f.visit_date,
                  address: &f.address,
                  contact: &f.contact,
                  email: &f.email,
                  description: &f.description,
                  media_urls: to_jsonb(&f.media_urls)?,
                  rating: i16::from(f.rating),
                  access_tags: to_jsonb(&f.access_tags)?,
                  theme_tags: to_jsonb(&f.theme_tags)?,
                  disciplines: to_jsonb(&f.disciplines)?,
                  main_theme: &f.main_theme,
                  other_themes: to_jsonb(&f.other_themes)?,
                  interdisciplinary_associations: to_jsonb(&f.interdisciplinary_associations)?,
                  additional_info: &f.additional_info,
                  inclusion_tags: to_jsonb(&f.inclusion_tags)?,
                  additional_inclusion: to_jsonb(&f.additional_inclusion)?,
                  digital_technologies: to_jsonb(&f.digital_technologies)?,
                  didactic_strategies: to_jsonb(&f.didactic_strategies)?,
                  technology_relationships: to_jsonb(&f.technology_relationships)?,
                  technology_developments: to_jsonb(&f.technology_developments)?,
                  contents: to_jsonb(&f.contents)?,
                  objectives: to_jsonb(&f.objectives)?,
                  methodologies: to_jsonb(&f.methodologies)?,
                  evaluations: to_jsonb(&f.evaluations)?,
                  learning_objective: &f.learning_objective,
                  general_methodology: &f.general_methodology,
                  society_relationship: &f.society_relationship,
                  teacher_contribution: &f.teacher_contribution,
                  recommended_references: &f.recommended_references })
    }
}

impl TryFrom<SpaceRow> for Space {
    type Error = PersistenceError;

    fn try_from(row: SpaceRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).ok()
                                             .filter(|r| *r <= MAX_RATING)
                                             .ok_or_else(|| {
                                                 PersistenceError::InvalidRow(format!("rating: {}", row.rating))
                                             })?;
        let fields =
            SpaceFields { name: row.name,
                          visit_date: row.visit_date,
                          address: row.address,
                          contact: row.contact,
                          email: row.email,
                          description: row.description,
                          media_urls: from_jsonb("media_urls", row.media_urls)?,
                          rating,
                          access_tags: from_jsonb("access_tags", row.access_tags)?,
                          theme_tags: from_jsonb("theme_tags", row.theme_tags)?,
                          disciplines: from_jsonb("disciplines", row.disciplines)?,
                          main_theme: row.main_theme,
                          other_themes: from_jsonb("other_themes", row.other_themes)?,
                          interdisciplinary_associations: from_jsonb("interdisciplinary_associations",
                                                                     row.interdisciplinary_associations)?,
                          additional_info: row.additional_info,
                          inclusion_tags: from_jsonb("inclusion_tags", row.inclusion_tags)?,
                          additional_inclusion: from_jsonb("additional_inclusion", row.additional_inclusion)?,
                          digital_technologies: from_jsonb("digital_technologies", row.digital_technologies)?,
                          didactic_strategies: from_jsonb("didactic_strategies", row.didactic_strategies)?,
                          technology_relationships: from_jsonb("technology_relationships",
                                                               row.technology_relationships)?,
                          technology_developments: from_jsonb("technology_developments", row.technology_developments)?,
                          contents: from_jsonb("contents", row.contents)?,
                          objectives: from_jsonb("objectives", row.objectives)?,
                          methodologies: from_jsonb("methodologies", row.methodologies)?,
                          evaluations: from_jsonb("evaluations", row.evaluations)?,
                          learning_objective: row.learning_objective,
                          general_methodology: row.general_methodology,
                          society_relationship: row.society_relationship,
                          teacher_contribution: row.teacher_contribution,
                          recommended_references: row.recommended_references };
        Ok(Space { id: row.id,
                   user_id: row.user_id,
                   fields,
                   review_count: row.review_count,
                   kind: row.kind,
                   website: row.website,
                   created_at: row.created_at,
                   updated_at: row.updated_at })
    }
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos drivers sólo reportan texto; best-effort sin SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Un insert sólo se repite ante conflictos de serialización: la
/// transacción abortada no dejó fila. Un timeout o una conexión caída pueden
/// haber confirmado el insert.
fn is_retryable_insert(e: &PersistenceError) -> bool {
    matches!(e, PersistenceError::SerializationConflict)
}

/// Retry simple con backoff lineal (hasta 3 reintentos: 15ms, 30ms, 45ms).
///
/// Sólo repite la unidad de trabajo provista por `f`; emite `warn!` por
/// intento.
pub(crate) fn with_retry<F, T>(f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    retry_while(is_retryable, f)
}

fn retry_while<F, T>(retryable: fn(&PersistenceError) -> bool, mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Gateway de espacios sobre Postgres.
pub struct PgSpaceGateway<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgSpaceGateway<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn insert_space(&self, record: &NewSpace) -> Result<Space, PersistenceError> {
        debug!("insert:start user_id={}", record.user_id);
        let columns = SpaceColumns::from_fields(&record.fields)?;
        // Obtener la conexión sí se reintenta; el insert en sí no es idempotente.
        let mut conn = with_retry(|| self.provider.connection())?;
        let row: SpaceRow = retry_while(is_retryable_insert, || {
                                diesel::insert_into(spaces::table).values((spaces::user_id.eq(record.user_id),
                                                                           &columns))
                                                                  .returning(SpaceRow::as_returning())
                                                                  .get_result(&mut conn)
                                                                  .map_err(PersistenceError::from)
                            })?;
        debug!("insert:done id={}", row.id);
        Space::try_from(row)
    }

    pub fn update_space(&self, id: Uuid, patch: &DraftRecord) -> Result<Space, PersistenceError> {
        debug!("update:start id={id} fields={}", patch.len());
        let row: SpaceRow = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run::<_, PersistenceError, _>(|tx| {
                    let current: SpaceRow = spaces::table.find(id)
                                                         .select(SpaceRow::as_select())
                                                         .for_update()
                                                         .first(tx)?;
                    let mut fields = Space::try_from(current)?.fields;
                    patch.apply_to(&mut fields).map_err(|e| PersistenceError::InvalidRow(e.to_string()))?;
                    let columns = SpaceColumns::from_fields(&fields)?;
                    let updated = diesel::update(spaces::table.find(id))
                        .set((&columns, spaces::updated_at.eq(Utc::now())))
                        .returning(SpaceRow::as_returning())
                        .get_result(tx)?;
                    Ok(updated)
                })
        })?;
        debug!("update:done id={id}");
        Space::try_from(row)
    }

    pub fn delete_space(&self, id: Uuid) -> Result<usize, PersistenceError> {
        let removed = with_retry(|| {
                          let mut conn = self.provider.connection()?;
                          diesel::delete(spaces::table.find(id)).execute(&mut conn).map_err(PersistenceError::from)
                      })?;
        debug!("delete:done id={id} rows={removed}");
        Ok(removed)
    }

    pub fn find_space(&self, id: Uuid) -> Result<Option<Space>, PersistenceError> {
        let row: Option<SpaceRow> = with_retry(|| {
                                        let mut conn = self.provider.connection()?;
                                        spaces::table.find(id)
                                                     .select(SpaceRow::as_select())
                                                     .first(&mut conn)
                                                     .optional()
                                                     .map_err(PersistenceError::from)
                                    })?;
        row.map(Space::try_from).transpose()
    }

    pub fn list_spaces(&self, order: SpaceOrder) -> Result<Vec<Space>, PersistenceError> {
        let rows: Vec<SpaceRow> = with_retry(|| {
                                      let mut conn = self.provider.connection()?;
                                      let query = spaces::table.select(SpaceRow::as_select()).into_boxed();
                                      let query = match order {
                                          SpaceOrder::CreatedAtDesc => query.order(spaces::created_at.desc()),
                                          SpaceOrder::CreatedAtAsc => query.order(spaces::created_at.asc()),
                                          SpaceOrder::NameAsc => query.order(spaces::name.asc()),
                                      };
                                      query.load(&mut conn).map_err(PersistenceError::from)
                                  })?;
        debug!("list:done count={}", rows.len());
        rows.into_iter().map(Space::try_from).collect()
    }
}

impl<P: ConnectionProvider> PersistenceGateway for PgSpaceGateway<P> {
    fn insert(&mut self, record: NewSpace) -> Result<Space, GatewayError> {
        Ok(self.insert_space(&record)?)
    }

    fn update(&mut self, id: Uuid, patch: &DraftRecord) -> Result<Space, GatewayError> {
        Ok(self.update_space(id, patch)?)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), GatewayError> {
        self.delete_space(id)?;
        Ok(())
    }

    fn select_by_id(&self, id: Uuid) -> Result<Option<Space>, GatewayError> {
        Ok(self.find_space(id)?)
    }

    fn select_all(&self, order: SpaceOrder) -> Result<Vec<Space>, GatewayError> {
        Ok(self.list_spaces(order)?)
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Ajusta tamaños inválidos (cero → 1, `min > max` → `min = max`), ejecuta
/// las migraciones tras el primer `get()` y devuelve
/// `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saberes_domain::TechnologyRelationship;

    fn row_with(rating: i16, contents: Value) -> SpaceRow {
        let now = Utc::now();
        SpaceRow { id: Uuid::new_v4(),
                   user_id: Uuid::new_v4(),
                   name: "Museu".into(),
                   visit_date: String::new(),
                   address: String::new(),
                   contact: String::new(),
                   email: String::new(),
                   description: String::new(),
                   media_urls: Value::Null,
                   rating,
                   access_tags: serde_json::json!([]),
                   theme_tags: serde_json::json!(["Local culture"]),
                   disciplines: Value::Null,
                   main_theme: String::new(),
                   other_themes: Value::Null,
                   interdisciplinary_associations: Value::Null,
                   additional_info: String::new(),
                   inclusion_tags: Value::Null,
                   additional_inclusion: Value::Null,
                   digital_technologies: Value::Null,
                   didactic_strategies: Value::Null,
                   technology_relationships: serde_json::json!([{"technologyName": "QR", "physics": "óptica"}]),
                   technology_developments: Value::Null,
                   contents,
                   objectives: Value::Null,
                   methodologies: Value::Null,
                   evaluations: Value::Null,
                   learning_objective: String::new(),
                   general_methodology: String::new(),
                   society_relationship: String::new(),
                   teacher_contribution: String::new(),
                   recommended_references: String::new(),
                   review_count: None,
                   kind: Some("museum".into()),
                   website: None,
                   created_at: now,
                   updated_at: now }
    }

    #[test]
    fn null_json_columns_read_as_empty() {
        let space = Space::try_from(row_with(4, Value::Null)).unwrap();
        assert!(space.fields.contents.is_empty());
        assert_eq!(space.fields.theme_tags, vec!["Local culture".to_string()]);
        assert_eq!(space.fields.technology_relationships,
                   vec![TechnologyRelationship { technology_name: "QR".into(),
                                                 physics: "óptica".into(),
                                                 ..Default::default() }]);
        assert_eq!(space.kind.as_deref(), Some("museum"));
    }

    #[test]
    fn out_of_range_rating_is_invalid() {
        assert!(matches!(Space::try_from(row_with(9, Value::Null)), Err(PersistenceError::InvalidRow(_))));
        assert!(matches!(Space::try_from(row_with(0, serde_json::json!("x"))),
                         Err(PersistenceError::InvalidRow(_))));
    }

    #[test]
    fn columns_encode_lists_as_json_arrays() {
        let fields = SpaceFields { contents: vec!["Óptica".into()],
                                   rating: 5,
                                   ..Default::default() };
        let cols = SpaceColumns::from_fields(&fields).unwrap();
        assert_eq!(cols.contents, serde_json::json!(["Óptica"]));
        assert_eq!(cols.media_urls, serde_json::json!([]));
        assert_eq!(cols.rating, 5);
    }

    #[test]
    fn unknown_connection_loss_is_retryable() {
        assert!(is_retryable(&PersistenceError::Unknown("Connection refused (os error 111)".into())));
        assert!(!is_retryable(&PersistenceError::NotFound));
    }

    #[test]
    fn insert_is_not_repeated_after_ambiguous_failures() {
        let mut calls = 0;
        let r: Result<(), _> = retry_while(is_retryable_insert, || {
            calls += 1;
            Err(PersistenceError::Unknown("timeout while waiting for reply".into()))
        });
        assert!(r.is_err());
        assert_eq!(calls, 1);

        let mut calls = 0;
        let r: Result<(), _> = retry_while(is_retryable_insert, || {
            calls += 1;
            Err(PersistenceError::TransientIo("connection closed".into()))
        });
        assert!(r.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn insert_is_repeated_after_serialization_conflict() {
        let mut calls = 0;
        let r = retry_while(is_retryable_insert, || {
            calls += 1;
            if calls < 3 {
                Err(PersistenceError::SerializationConflict)
            } else {
                Ok(calls)
            }
        });
        assert_eq!(r.unwrap(), 3);
    }
}
