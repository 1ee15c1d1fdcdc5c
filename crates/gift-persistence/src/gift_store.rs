use crate::schema;
use crate::schema::gift_instances::dsl as gi_dsl;
use crate::schema::template_overrides::dsl as ov_dsl;
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::result::Error as DieselError;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use gift_domain::{DataRecord, TemplateOverride};
use gift_flow::{DataStore, FlowError, GiftInstance, Result, TemplateOverrideSource};
use std::sync::Arc;
use uuid::Uuid;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");
/// Base en memoria compartida usada cuando no hay URL configurada.
pub const DEFAULT_DB_URL: &str = "file:giftflow?mode=memory&cache=shared";

type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
    diesel::sql_query("PRAGMA busy_timeout = 5000;").execute(conn)
                                                     .map_err(diesel::r2d2::Error::QueryError)?;
    Ok(())
  }
}

/// Almacén Diesel que implementa `DataStore` y `TemplateOverrideSource`.
pub struct DieselDataStore {
  pool: Arc<DbPool>,
}

impl DieselDataStore {
  /// Abre (o crea) la base en `database_url` y aplica las migraciones
  /// pendientes.
  pub fn new(database_url: &str) -> Result<Self> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder().max_size(4)
                              .connection_customizer(Box::new(SqlitePragmas))
                              .build(manager)
                              .map_err(|e| FlowError::Storage(format!("pool: {}", e)))?;
    let store = DieselDataStore { pool: Arc::new(pool) };
    let mut c = store.conn()?;
    if !database_url.contains("mode=memory") {
      let _ = diesel::sql_query("PRAGMA journal_mode = WAL;").execute(&mut c);
    }
    c.run_pending_migrations(MIGRATIONS)
     .map_err(|e| FlowError::Storage(format!("migraciones: {}", e)))?;
    log::debug!("almacén SQLite listo en {}", database_url);
    drop(c);
    Ok(store)
  }

  fn conn_raw(&self) -> std::result::Result<PooledConnection<ConnectionManager<SqliteConnection>>, r2d2::Error> {
    self.pool.get()
  }

  fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
    self.conn_raw().map_err(|e| FlowError::Storage(format!("pool: {}", e)))
  }
}

// Filas Diesel
#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schema::gift_instances)]
struct InstanceRow {
  pub id: String,
  pub template_id: i64,
  pub data: String,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schema::template_overrides)]
struct OverrideRow {
  pub template_id: i64,
  pub title: Option<String>,
  pub price: Option<f64>,
  pub original_price: Option<f64>,
  pub tag: Option<String>,
  pub is_active: Option<bool>,
  pub updated_at: String,
}

fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T> {
  res.map_err(|e| FlowError::Storage(format!("db: {}", e)))
}

fn timestamp(at: DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc))
                                 .map_err(|e| FlowError::Storage(format!("fecha inválida '{}': {}", s, e)))
}

/// Un registro ilegible se trata como vacío: los pasos usan sus valores por
/// defecto.
fn parse_data(id: &str, raw: &str) -> DataRecord {
  match serde_json::from_str(raw) {
    Ok(value) => DataRecord::from_value(value),
    Err(e) => {
      log::warn!("instancia {}: datos ilegibles ({}); se usa un registro vacío", id, e);
      DataRecord::new()
    }
  }
}

fn encode_data(data: &DataRecord) -> Result<String> {
  serde_json::to_string(data).map_err(|e| FlowError::Storage(format!("serialización: {}", e)))
}

impl InstanceRow {
  fn into_instance(self) -> Result<GiftInstance> {
    let id = Uuid::parse_str(&self.id).map_err(|e| FlowError::Storage(format!("invalid uuid: {}", e)))?;
    Ok(GiftInstance { id,
                      template_id: self.template_id,
                      data: parse_data(&self.id, &self.data),
                      created_at: parse_timestamp(&self.created_at)?,
                      updated_at: parse_timestamp(&self.updated_at)? })
  }
}

impl From<OverrideRow> for TemplateOverride {
  fn from(r: OverrideRow) -> Self {
    TemplateOverride { template_id: r.template_id,
                       title: r.title,
                       price: r.price,
                       original_price: r.original_price,
                       tag: r.tag,
                       is_active: r.is_active }
  }
}

/// Fusiona `partial` sobre la fila `id`. Devuelve `false` si no existe.
fn merge_row(conn: &mut SqliteConnection, id: &str, partial: &DataRecord) -> QueryResult<bool> {
  let current = gi_dsl::gift_instances.filter(gi_dsl::id.eq(id))
                                      .select(gi_dsl::data)
                                      .first::<String>(conn)
                                      .optional()?;
  let Some(raw) = current else {
    return Ok(false);
  };
  let mut data = parse_data(id, &raw);
  data.merge_all(partial);
  let encoded = serde_json::to_string(&data).map_err(|e| DieselError::SerializationError(Box::new(e)))?;
  diesel::update(gi_dsl::gift_instances.filter(gi_dsl::id.eq(id)))
    .set((gi_dsl::data.eq(encoded), gi_dsl::updated_at.eq(timestamp(Utc::now()))))
    .execute(conn)?;
  Ok(true)
}

impl DataStore for DieselDataStore {
  fn create_instance(&self, template_id: i64, data: &DataRecord) -> Result<Uuid> {
    let mut conn = self.conn()?;
    let id = Uuid::new_v4();
    let now = timestamp(Utc::now());
    let row = InstanceRow { id: id.to_string(),
                            template_id,
                            data: encode_data(data)?,
                            created_at: now.clone(),
                            updated_at: now };
    map_db_err(diesel::insert_into(gi_dsl::gift_instances).values(&row).execute(&mut conn))?;
    Ok(id)
  }

  fn get_instance(&self, instance_id: &Uuid) -> Result<GiftInstance> {
    let mut conn = self.conn()?;
    let row = map_db_err(gi_dsl::gift_instances.filter(gi_dsl::id.eq(instance_id.to_string()))
                                               .first::<InstanceRow>(&mut conn)
                                               .optional())?;
    match row {
      Some(r) => r.into_instance(),
      None => Err(FlowError::NotFound(format!("instancia {}", instance_id))),
    }
  }

  fn update(&self, instance_id: &Uuid, partial: &DataRecord) -> Result<()> {
    let mut conn = self.conn()?;
    let id_s = instance_id.to_string();
    // Lectura y escritura en una sola transacción.
    let found = map_db_err(conn.immediate_transaction(|conn| merge_row(conn, &id_s, partial)))?;
    if !found {
      return Err(FlowError::NotFound(format!("instancia {}", instance_id)));
    }
    Ok(())
  }

  fn save(&self, instance_id: &Uuid, data: &DataRecord) -> Result<()> {
    let mut conn = self.conn()?;
    let n = map_db_err(diesel::update(gi_dsl::gift_instances.filter(gi_dsl::id.eq(instance_id.to_string())))
                         .set((gi_dsl::data.eq(encode_data(data)?), gi_dsl::updated_at.eq(timestamp(Utc::now()))))
                         .execute(&mut conn))?;
    if n == 0 {
      return Err(FlowError::NotFound(format!("instancia {}", instance_id)));
    }
    Ok(())
  }

  fn list_instances(&self) -> Result<Vec<GiftInstance>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(gi_dsl::gift_instances.order((gi_dsl::created_at.asc(), gi_dsl::id.asc()))
                                                .load::<InstanceRow>(&mut conn))?;
    rows.into_iter().map(InstanceRow::into_instance).collect()
  }

  fn delete_instance(&self, instance_id: &Uuid) -> Result<()> {
    let mut conn = self.conn()?;
    let n = map_db_err(diesel::delete(gi_dsl::gift_instances.filter(gi_dsl::id.eq(instance_id.to_string())))
                         .execute(&mut conn))?;
    if n == 0 {
      return Err(FlowError::NotFound(format!("instancia {}", instance_id)));
    }
    Ok(())
  }
}

impl TemplateOverrideSource for DieselDataStore {
  fn list_overrides(&self) -> Result<Vec<TemplateOverride>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(ov_dsl::template_overrides.order(ov_dsl::template_id.asc())
                                                    .load::<OverrideRow>(&mut conn))?;
    Ok(rows.into_iter().map(TemplateOverride::from).collect())
  }

  fn put_override(&self, ov: &TemplateOverride) -> Result<()> {
    let mut conn = self.conn()?;
    let row = OverrideRow { template_id: ov.template_id,
                            title: ov.title.clone(),
                            price: ov.price,
                            original_price: ov.original_price,
                            tag: ov.tag.clone(),
                            is_active: ov.is_active,
                            updated_at: timestamp(Utc::now()) };
    map_db_err(diesel::replace_into(ov_dsl::template_overrides).values(&row).execute(&mut conn))?;
    Ok(())
  }
}

/// Construye el almacén desde el entorno (`.env` incluido):
/// `GIFTFLOW_DB_URL`, luego `DATABASE_URL`, y si no hay ninguna una base
/// en memoria compartida.
pub fn new_from_env() -> Result<DieselDataStore> {
  dotenvy::dotenv().ok();
  let url = std::env::var("GIFTFLOW_DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
                                            .unwrap_or_else(|_| DEFAULT_DB_URL.into());
  let url_l = url.to_lowercase();
  if url_l.starts_with("postgres") || url_l.starts_with("mysql") {
    return Err(FlowError::Storage(format!("gift-persistence sólo admite SQLite: '{}'", url)));
  }
  DieselDataStore::new(&url)
}
