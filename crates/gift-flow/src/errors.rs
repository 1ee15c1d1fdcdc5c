// Archivo: errors.rs
// Propósito: definir los errores del motor de plantillas y el alias Result<T>
// usado por las APIs del crate.
use gift_domain::DomainError;
use thiserror::Error;
/// Errores comunes del motor.
///
/// Ninguno de estos errores llega al usuario final: un id de paso
/// desconocido o un campo faltante no son errores (se resuelven con la
/// política de fallback y los valores por defecto). Se usan en la frontera
/// de persistencia y al preparar plantillas.
#[derive(Error, Debug)]
pub enum FlowError {
  /// Entidad no encontrada (instancia de regalo, plantilla).
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Error del almacén de datos (BD remota, archivo, etc.).
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
  /// Error del modelo de plantillas.
  #[error("Error de dominio: {0}")]
  Domain(#[from] DomainError),
}
/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, FlowError>;
