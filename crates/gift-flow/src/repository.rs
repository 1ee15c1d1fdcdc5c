// Archivo: repository.rs
// Propósito: definir el contrato del adaptador de datos (`DataStore`) y el
// origen de overrides de plantillas. Describe lo que el motor espera de la
// base de datos remota; el motor no depende de su esquema ni de su lenguaje
// de consultas.
use crate::errors::Result;
use chrono::{DateTime, Utc};
use gift_domain::{DataRecord, TemplateOverride};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Instancia de regalo creada a partir de una plantilla.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftInstance {
    pub id: Uuid,
    pub template_id: i64,
    pub data: DataRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contrato mínimo del almacén de instancias.
///
/// `save`/`update` son de consistencia eventual: el controlador nunca espera
/// su resultado para renderizar.
pub trait DataStore: Send + Sync {
    /// Crea una instancia para `template_id` con su registro inicial.
    fn create_instance(&self, template_id: i64, data: &DataRecord) -> Result<Uuid>;

    /// Obtiene la instancia completa. `NotFound` si no existe.
    fn get_instance(&self, instance_id: &Uuid) -> Result<GiftInstance>;

    /// Registro de datos de la instancia.
    fn get(&self, instance_id: &Uuid) -> Result<DataRecord> {
        Ok(self.get_instance(instance_id)?.data)
    }

    /// Fusiona `partial` sobre el registro guardado.
    fn update(&self, instance_id: &Uuid, partial: &DataRecord) -> Result<()>;

    /// Reemplaza el registro completo.
    fn save(&self, instance_id: &Uuid, data: &DataRecord) -> Result<()>;

    /// Lista todas las instancias (orden de creación).
    fn list_instances(&self) -> Result<Vec<GiftInstance>>;

    /// Elimina una instancia. `NotFound` si no existe.
    fn delete_instance(&self, instance_id: &Uuid) -> Result<()>;
}

/// Origen de overrides remotos de metadatos de plantillas.
pub trait TemplateOverrideSource: Send + Sync {
    fn list_overrides(&self) -> Result<Vec<TemplateOverride>>;

    /// Inserta o reemplaza el override de `ov.template_id`.
    fn put_override(&self, ov: &TemplateOverride) -> Result<()>;
}
