// Archivo: registry.rs
// Propósito: registro ordenado id de paso -> definición + fábrica, para una
// única plantilla. El orden de inserción es el orden narrativo.
use crate::config::EngineConfig;
use crate::step::{PageStep, StepFactory, StepProps};
use gift_domain::{DataRecord, FallbackMode, StepDefinition, TemplateDefinition};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Entrada del registro: la definición declarativa y quién la construye.
#[derive(Clone)]
pub struct RegisteredStep {
    definition: StepDefinition,
    factory: Arc<dyn StepFactory>,
}

impl RegisteredStep {
    pub fn new(definition: StepDefinition, factory: Arc<dyn StepFactory>) -> Self {
        Self { definition, factory }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn definition(&self) -> &StepDefinition {
        &self.definition
    }

    pub fn build(&self, data: &DataRecord, editing: bool, config: &EngineConfig) -> Box<dyn PageStep> {
        self.factory.build(&StepProps { definition: &self.definition, data, editing, config })
    }
}

impl fmt::Debug for RegisteredStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredStep").field("definition", &self.definition).finish()
    }
}

/// Registro de pasos de una plantilla.
///
/// `lookup` nunca falla: la ausencia se señala con `None` y el controlador
/// aplica la política de fallback (`FallbackMode`).
#[derive(Debug, Clone)]
pub struct StepRegistry {
    slug: String,
    fallback: FallbackMode,
    entries: IndexMap<String, RegisteredStep>,
}

impl StepRegistry {
    pub fn new(slug: impl Into<String>, fallback: FallbackMode) -> Self {
        Self { slug: slug.into(), fallback, entries: IndexMap::new() }
    }

    /// Transformación pura y ordenada de `template.pages` en un registro.
    pub fn from_template(template: &TemplateDefinition, factory: Arc<dyn StepFactory>) -> Self {
        let mut registry = Self::new(template.slug.clone(), template.fallback_mode);
        for page in template.pages.iter() {
            registry.register(page.clone(), factory.clone());
        }
        registry
    }

    /// Registra un paso al final. Un id repetido conserva la primera entrada
    /// y devuelve `false`.
    pub fn register(&mut self, definition: StepDefinition, factory: Arc<dyn StepFactory>) -> bool {
        if self.entries.contains_key(&definition.id) {
            log::warn!("plantilla '{}': paso '{}' duplicado, se conserva el primero", self.slug, definition.id);
            return false;
        }
        self.entries.insert(definition.id.clone(), RegisteredStep::new(definition, factory));
        true
    }

    pub fn lookup(&self, step_id: &str) -> Option<&RegisteredStep> {
        self.entries.get(step_id)
    }

    pub fn first(&self) -> Option<&RegisteredStep> {
        self.entries.first().map(|(_, s)| s)
    }

    pub fn first_id(&self) -> Option<&str> {
        self.entries.keys().next().map(|k| k.as_str())
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.entries.get_index_of(step_id)
    }

    /// Siguiente id en orden narrativo, o `None` si `step_id` es el último o
    /// no está registrado.
    pub fn next_after(&self, step_id: &str) -> Option<&str> {
        let idx = self.position(step_id)?;
        self.entries.get_index(idx + 1).map(|(k, _)| k.as_str())
    }

    pub fn is_last(&self, step_id: &str) -> bool {
        matches!(self.position(step_id), Some(i) if i + 1 == self.entries.len())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn fallback_mode(&self) -> FallbackMode {
        self.fallback
    }
}
