// Archivo: effects.rs
// Propósito: efectos globales (confeti, audio, recarga) como capacidades
// inyectadas en el controlador, para poder sustituirlas por host o en tests.
use serde::{Deserialize, Serialize};

/// Efecto solicitado por un paso o por el controlador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Effect {
    /// Ráfaga de confeti con una cantidad aproximada de partículas.
    Confetti { particles: u32 },
    /// Reproducir un sonido identificado por `cue`.
    Audio { cue: String },
    /// Acción terminal: reiniciar la experiencia completa.
    Reload,
}

/// Capacidades del host. La implementación decide cómo se materializa cada
/// efecto (un navegador, una terminal, un mock).
pub trait Effects: Send + Sync {
    fn trigger(&self, effect: &Effect);
}

/// Host sin efectos: solo registra en el log.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEffects;

impl Effects for NoopEffects {
    fn trigger(&self, effect: &Effect) {
        log::debug!("efecto ignorado: {:?}", effect);
    }
}
