//! gift-domain: modelo de datos de las plantillas de regalo.
//!
//! Define `TemplateDefinition`, `StepDefinition`, `StepType`, el registro de
//! datos editable por el usuario (`DataRecord`) y el catálogo de plantillas
//! con sus overrides remotos.
mod catalog;
mod data_record;
mod errors;
mod template;

pub use catalog::{Catalog, TemplateOverride};
pub use data_record::{DataRecord, Resolved};
pub use errors::DomainError;
pub use template::{FallbackMode, StepDefinition, StepType, TemplateDefinition};
