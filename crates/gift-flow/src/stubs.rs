// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye un almacén de instancias en memoria (`InMemoryDataStore`) y un host
// de efectos que graba lo que recibe (`RecordingEffects`). No son durables.
use crate::effects::{Effect, Effects};
use crate::errors::{FlowError, Result};
use crate::repository::{DataStore, GiftInstance, TemplateOverrideSource};
use chrono::Utc;
use gift_domain::{DataRecord, TemplateOverride};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

// Almacén mínimo en memoria (no durable)
pub struct InMemoryDataStore {
    /// Instancias indexadas por id.
    instances: Mutex<HashMap<Uuid, GiftInstance>>,
    /// Orden de creación, para `list_instances`.
    order: Mutex<Vec<Uuid>>,
    /// Overrides por id de plantilla.
    overrides: Mutex<HashMap<i64, TemplateOverride>>,
    /// Simula una caída del servicio remoto.
    unavailable: AtomicBool,
    /// Escrituras aplicadas con `update`/`save`.
    writes: AtomicUsize,
}

impl InMemoryDataStore {
    /// Crea una nueva instancia del almacén en memoria.
    pub fn new() -> Self {
        Self { instances: Mutex::new(HashMap::new()),
               order: Mutex::new(Vec::new()),
               overrides: Mutex::new(HashMap::new()),
               unavailable: AtomicBool::new(false),
               writes: AtomicUsize::new(0) }
    }

    /// Hace que todas las operaciones fallen con `FlowError::Storage` hasta
    /// volver a llamar con `false`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `FlowError::Storage`.
    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> std::result::Result<MutexGuard<'a, T>, FlowError> {
        m.lock().map_err(|e| FlowError::Storage(format!("mutex poisoned: {:?}", e)))
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(FlowError::Storage("almacén no disponible".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore for InMemoryDataStore {
    fn create_instance(&self, template_id: i64, data: &DataRecord) -> Result<Uuid> {
        self.check_available()?;
        let id = Uuid::new_v4();
        let now = Utc::now();
        let instance = GiftInstance { id, template_id, data: data.clone(), created_at: now, updated_at: now };
        self.lock(&self.instances)?.insert(id, instance);
        self.lock(&self.order)?.push(id);
        Ok(id)
    }

    fn get_instance(&self, instance_id: &Uuid) -> Result<GiftInstance> {
        self.check_available()?;
        self.lock(&self.instances)?
            .get(instance_id)
            .cloned()
            .ok_or(FlowError::NotFound(format!("instancia {}", instance_id)))
    }

    fn update(&self, instance_id: &Uuid, partial: &DataRecord) -> Result<()> {
        self.check_available()?;
        let mut instances = self.lock(&self.instances)?;
        let instance = instances.get_mut(instance_id)
                                .ok_or(FlowError::NotFound(format!("instancia {}", instance_id)))?;
        instance.data.merge_all(partial);
        instance.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn save(&self, instance_id: &Uuid, data: &DataRecord) -> Result<()> {
        self.check_available()?;
        let mut instances = self.lock(&self.instances)?;
        let instance = instances.get_mut(instance_id)
                                .ok_or(FlowError::NotFound(format!("instancia {}", instance_id)))?;
        instance.data = data.clone();
        instance.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn list_instances(&self) -> Result<Vec<GiftInstance>> {
        self.check_available()?;
        let instances = self.lock(&self.instances)?;
        let order = self.lock(&self.order)?;
        Ok(order.iter().filter_map(|id| instances.get(id).cloned()).collect())
    }

    fn delete_instance(&self, instance_id: &Uuid) -> Result<()> {
        self.check_available()?;
        let removed = self.lock(&self.instances)?.remove(instance_id);
        if removed.is_none() {
            return Err(FlowError::NotFound(format!("instancia {}", instance_id)));
        }
        self.lock(&self.order)?.retain(|id| id != instance_id);
        Ok(())
    }
}

impl TemplateOverrideSource for InMemoryDataStore {
    fn list_overrides(&self) -> Result<Vec<TemplateOverride>> {
        self.check_available()?;
        let mut out: Vec<TemplateOverride> = self.lock(&self.overrides)?.values().cloned().collect();
        out.sort_by_key(|o| o.template_id);
        Ok(out)
    }

    fn put_override(&self, ov: &TemplateOverride) -> Result<()> {
        self.check_available()?;
        self.lock(&self.overrides)?.insert(ov.template_id, ov.clone());
        Ok(())
    }
}

/// Host de efectos que guarda cada efecto recibido, para inspección.
#[derive(Debug, Default)]
pub struct RecordingEffects {
    seen: Mutex<Vec<Effect>>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, pred: impl Fn(&Effect) -> bool) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).iter().filter(|e| pred(e)).count()
    }

    pub fn reloads(&self) -> usize {
        self.count(|e| matches!(e, Effect::Reload))
    }
}

impl Effects for RecordingEffects {
    fn trigger(&self, effect: &Effect) {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).push(effect.clone());
    }
}
