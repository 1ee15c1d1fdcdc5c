//! Persistencia SQLite (Diesel) para las instancias de regalo.
//! Implementa `DataStore` y `TemplateOverrideSource` de `gift-flow`; el
//! detalle está en `gift_store.rs`.

mod gift_store;
pub mod schema;

pub use gift_store::{new_from_env, DieselDataStore, DEFAULT_DB_URL, MIGRATIONS};
