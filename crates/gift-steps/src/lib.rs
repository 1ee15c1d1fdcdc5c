//! Crate `gift-steps`: pasos estándar de las plantillas de regalo
//!
//! Cada tipo de página (`loading`, `countdown`, `celebration`, `photo`, ...)
//! tiene aquí su implementación de `PageStep`. `StandardSteps` elige la
//! implementación a partir de la definición y `build_registry` arma el
//! registro de una plantilla completa.
//!
//! Convenciones comunes a todos los pasos:
//! - Cada campo mostrado se resuelve como `data[campo]` o su valor por
//!   defecto; un registro vacío siempre produce una vista válida.
//! - En modo edición no hay avances automáticos; la acción "continue"
//!   permite recorrer la plantilla.
//!
//! ```rust
//! use gift_domain::{Catalog, DataRecord};
//! use gift_flow::FlowController;
//! let catalog = Catalog::builtin().unwrap();
//! let registry = gift_steps::registry_for_slug(&catalog, "birthday-surprise").unwrap();
//! let mut controller = FlowController::new(registry, DataRecord::new());
//! assert_eq!(controller.view().step_id, "p1");
//! ```
mod common;
pub mod kit;
pub mod steps;

pub use kit::{build_registry, registry_for_slug, StandardSteps};
pub use steps::*;
