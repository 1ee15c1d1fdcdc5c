// Archivo: timers.rs
// Propósito: cola de timers en tiempo virtual. Todo timer queda etiquetado
// con la generación del paso que lo creó para poder cancelarlos en bloque al
// desmontar el paso.
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Identificador de un timer programado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Timer vencido entregado al controlador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub generation: u64,
    pub tag: String,
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u64,
    tag: String,
    period: Option<Duration>,
}

/// Planificador de un solo hilo.
///
/// El tiempo sólo avanza cuando el host lo indica (`pop_due` + `advance_to`),
/// lo que hace el comportamiento de los pasos determinista.
#[derive(Debug)]
pub struct Scheduler {
    origin: DateTime<Utc>,
    elapsed: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), Entry>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_origin(Utc::now())
    }

    /// Planificador cuyo reloj de pared arranca en `origin`.
    pub fn with_origin(origin: DateTime<Utc>) -> Self {
        Self { origin, elapsed: Duration::ZERO, next_id: 1, queue: BTreeMap::new() }
    }

    /// Tiempo virtual transcurrido desde el origen.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reloj de pared equivalente al tiempo virtual.
    pub fn now(&self) -> DateTime<Utc> {
        self.origin + chrono::Duration::from_std(self.elapsed).unwrap_or_else(|_| chrono::Duration::zero())
    }

    pub fn schedule(&mut self, generation: u64, delay: Duration, tag: &str) -> TimerId {
        self.insert(generation, delay, tag, None)
    }

    /// Timer repetitivo. Un periodo cero se trata como 1 ms.
    pub fn schedule_interval(&mut self, generation: u64, period: Duration, tag: &str) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(generation, period, tag, Some(period))
    }

    fn insert(&mut self, generation: u64, delay: Duration, tag: &str, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((self.elapsed + delay, id), Entry { generation, tag: tag.to_string(), period });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|(_, tid), _| *tid != id);
        before != self.queue.len()
    }

    /// Cancela todos los timers de una generación. Devuelve cuántos había.
    pub fn cancel_generation(&mut self, generation: u64) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, e| e.generation != generation);
        before - self.queue.len()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_for(&self, generation: u64) -> usize {
        self.queue.values().filter(|e| e.generation == generation).count()
    }

    /// Extrae el siguiente timer que vence antes o en `deadline`, moviendo el
    /// reloj hasta su vencimiento. Los intervalos se reprograman.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<FiredTimer> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due > deadline {
            return None;
        }
        let entry = self.queue.remove(&(due, id))?;
        self.elapsed = self.elapsed.max(due);
        if let Some(period) = entry.period {
            self.queue.insert((due + period, id), entry.clone());
        }
        Some(FiredTimer { id, generation: entry.generation, tag: entry.tag, at: due })
    }

    /// Mueve el reloj hasta `deadline` (nunca hacia atrás).
    pub fn advance_to(&mut self, deadline: Duration) {
        self.elapsed = self.elapsed.max(deadline);
    }
}
