//! Crate `gift-flow`: motor de secuencias de páginas para plantillas
//!
//! Este crate define el registro de pasos (`StepRegistry`), el contrato de un
//! paso de página (`PageStep`), el controlador (`FlowController`) que resuelve
//! el id actual y aplica avances y ediciones, un planificador de timers en
//! tiempo virtual y el contrato del almacén de datos (`DataStore`) con una
//! implementación en memoria útil para pruebas (`InMemoryDataStore`).
//!
//! Diseño resumido:
//! - Cada plantilla es datos (su lista `pages`), no código: el registro se
//!   construye a partir de la definición con una `StepFactory`.
//! - Un id desconocido nunca es un error: se aplica el fallback de la
//!   plantilla (primer paso o "Page Not Linked").
//! - Cada montaje tiene una generación; los timers y avances de generaciones
//!   anteriores se ignoran.
//!
//! Ejemplo rápido:
//! ```rust
//! use gift_domain::{DataRecord, FallbackMode};
//! use gift_flow::{FlowController, StepRegistry};
//! let registry = StepRegistry::new("demo", FallbackMode::Placeholder);
//! let mut controller = FlowController::new(registry, DataRecord::new());
//! assert!(controller.render("p99", false).is_placeholder());
//! ```
pub mod config;
pub mod controller;
pub mod effects;
pub mod errors;
pub mod fields;
pub mod placeholder;
pub mod registry;
pub mod repository;
pub mod service;
pub mod step;
pub mod stubs;
pub mod timers;
pub mod view;

pub use config::*;
pub use controller::*;
pub use effects::*;
pub use errors::*;
pub use fields::FieldSpec;
pub use placeholder::PlaceholderStep;
pub use registry::*;
pub use repository::*;
pub use service::*;
pub use step::*;
pub use stubs::*;
pub use timers::*;
pub use view::*;
