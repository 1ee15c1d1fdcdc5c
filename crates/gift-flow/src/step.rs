// Archivo: step.rs
// Propósito: contrato de un paso de página (`PageStep`) y el contexto con el
// que el paso pide avanzar, programar timers o actualizar campos.
use crate::config::EngineConfig;
use crate::effects::Effect;
use crate::timers::{Scheduler, TimerId};
use crate::view::StepView;
use chrono::{DateTime, Utc};
use gift_domain::{DataRecord, StepDefinition};
use serde_json::Value;
use std::time::Duration;

/// Etiqueta reservada para los timers de avance automático.
pub const ADVANCE_TAG: &str = "__advance";

/// Identifica una instancia montada de un paso. El controlador ignora toda
/// petición que llegue con un handle que ya no es el actual.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepHandle {
    generation: u64,
    step_id: String,
}

impl StepHandle {
    pub fn new(generation: u64, step_id: impl Into<String>) -> Self {
        Self { generation, step_id: step_id.into() }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn step_id(&self) -> &str {
        &self.step_id
    }
}

/// Entradas que el host entrega al paso montado.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// Botón o clic en cualquier parte; `id` identifica la acción.
    Action(String),
    /// Nueva posición de un slider continuo (0..=100).
    Slider(f64),
    /// Un elemento arrastrado soltado sobre un destino.
    Drop { item: String, target: String },
    /// Edición en línea de un campo (sólo en modo edición).
    Edit { field: String, value: Value },
    /// Una imagen no pudo cargarse.
    AssetFailed { src: String },
    /// Timer vencido con su etiqueta.
    Timer(String),
}

impl StepInput {
    pub fn action(id: &str) -> Self {
        StepInput::Action(id.to_string())
    }

    pub fn edit(field: &str, value: Value) -> Self {
        StepInput::Edit { field: field.to_string(), value }
    }

    pub fn drop_on(item: &str, target: &str) -> Self {
        StepInput::Drop { item: item.to_string(), target: target.to_string() }
    }
}

/// Intenciones que un paso emite hacia el controlador.
#[derive(Debug, Clone, PartialEq)]
pub enum StepIntent {
    Advance,
    UpdateField { field: String, value: Value },
    Effect(Effect),
    Reload,
}

/// Datos con los que se construye un paso.
pub struct StepProps<'a> {
    pub definition: &'a StepDefinition,
    pub data: &'a DataRecord,
    pub editing: bool,
    pub config: &'a EngineConfig,
}

/// Contexto pasado al paso en cada montaje/entrada.
///
/// El paso sólo ve el registro de datos en lectura; para escribir emite
/// `update_field`. Los timers que programa quedan ligados a su handle.
pub struct StepContext<'a> {
    handle: &'a StepHandle,
    data: &'a DataRecord,
    editing: bool,
    scheduler: &'a mut Scheduler,
    intents: &'a mut Vec<StepIntent>,
}

impl<'a> StepContext<'a> {
    pub fn new(handle: &'a StepHandle,
               data: &'a DataRecord,
               editing: bool,
               scheduler: &'a mut Scheduler,
               intents: &'a mut Vec<StepIntent>)
               -> Self {
        Self { handle, data, editing, scheduler, intents }
    }

    pub fn handle(&self) -> &StepHandle {
        self.handle
    }

    pub fn data(&self) -> &DataRecord {
        self.data
    }

    pub fn editing(&self) -> bool {
        self.editing
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.scheduler.now()
    }

    /// Pide al controlador pasar al siguiente paso.
    pub fn advance(&mut self) {
        self.intents.push(StepIntent::Advance);
    }

    /// Avance automático tras `delay`. En modo edición no se programa nada y
    /// devuelve `None`.
    pub fn advance_after(&mut self, delay: Duration) -> Option<TimerId> {
        if self.editing {
            log::debug!("paso {}: avance automático suprimido en modo edición", self.handle.step_id());
            return None;
        }
        Some(self.scheduler.schedule(self.handle.generation(), delay, ADVANCE_TAG))
    }

    /// Timer de uso propio del paso; al vencer llega como `StepInput::Timer`.
    pub fn schedule(&mut self, delay: Duration, tag: &str) -> TimerId {
        self.scheduler.schedule(self.handle.generation(), delay, tag)
    }

    pub fn schedule_interval(&mut self, period: Duration, tag: &str) -> TimerId {
        self.scheduler.schedule_interval(self.handle.generation(), period, tag)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.scheduler.cancel(id)
    }

    pub fn update_field(&mut self, field: &str, value: Value) {
        self.intents.push(StepIntent::UpdateField { field: field.to_string(), value });
    }

    pub fn effect(&mut self, effect: Effect) {
        self.intents.push(StepIntent::Effect(effect));
    }

    /// Reinicio completo de la experiencia; sólo se respeta en el último paso.
    pub fn reload(&mut self) {
        self.intents.push(StepIntent::Reload);
    }
}

/// Un paso de página: decide internamente cuándo pedir avance.
pub trait PageStep {
    /// Llamado una vez al montar el paso (arranque de timers).
    fn mount(&mut self, _ctx: &mut StepContext<'_>) {}

    /// Reacciona a una entrada del host o a un timer propio.
    fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>);

    /// Render headless. Nunca debe fallar, aunque `data` esté vacío.
    fn view(&self, data: &DataRecord, editing: bool) -> StepView;
}

/// Construye pasos a partir de su definición.
pub trait StepFactory: Send + Sync {
    fn build(&self, props: &StepProps<'_>) -> Box<dyn PageStep>;
}
