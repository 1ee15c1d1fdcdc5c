// Archivo: config.rs
// Propósito: valores por defecto del motor. La `config` de cada paso en la
// plantilla tiene prioridad sobre estos valores.
use serde::{Deserialize, Serialize};

/// Configuración del motor de pasos.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Espera de los pasos de carga antes de avanzar solos.
    pub loading_delay_ms: u64,
    /// Umbral (0..=100) a partir del cual un slider se considera completado.
    pub slider_threshold: f64,
    /// Pausa de celebración entre completar una interacción y avanzar.
    pub celebrate_ms: u64,
    /// Duración del estado final del pastel antes de avanzar.
    pub cake_hold_ms: u64,
    /// Periodo de refresco de las cuentas regresivas.
    pub countdown_poll_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { loading_delay_ms: 4000,
                       slider_threshold: 98.0,
                       celebrate_ms: 800,
                       cake_hold_ms: 3000,
                       countdown_poll_ms: 1000 }
    }
}
