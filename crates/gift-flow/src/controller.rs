// Archivo: controller.rs
// Propósito: `FlowController`, dueño del paso actual y del registro de datos
// de una instancia de regalo. Resuelve ids contra el registro, monta los
// pasos, entrega entradas y timers, y aplica las intenciones que emiten.
use crate::config::EngineConfig;
use crate::effects::{Effect, Effects, NoopEffects};
use crate::placeholder::PlaceholderStep;
use crate::registry::StepRegistry;
use crate::step::{PageStep, StepContext, StepHandle, StepInput, StepIntent, ADVANCE_TAG};
use crate::timers::{FiredTimer, Scheduler};
use crate::view::StepView;
use gift_domain::{DataRecord, FallbackMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Máximo de entradas que conserva el historial; las más antiguas se
/// descartan primero.
pub const HISTORY_LIMIT: usize = 256;

/// Estado transitorio del flujo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    pub current_step_id: String,
    pub editing: bool,
}

/// Cómo se resolvió el id actual contra el registro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Registered,
    /// Id desconocido sustituido por el primer paso.
    FirstStep { requested: String },
    /// Id desconocido mostrado como "Page Not Linked".
    Placeholder { requested: String },
}

/// Entrada del historial de transiciones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Avance secuencial pedido por el paso.
    Advanced { from: String, to: String },
    /// Navegación explícita del host (`advance_to`/`render`).
    Navigated { to: String },
    /// Acción terminal desde el último paso: la experiencia vuelve a empezar.
    Reloaded { from: String },
}

/// Props del contrato de renderizado: `pageId`, `data`, `isEditing`. Los
/// callbacks `onNext`/`onUpdate` se corresponden con `StepContext::advance` y
/// `StepContext::update_field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderProps {
    pub page_id: String,
    #[serde(default)]
    pub data: DataRecord,
    #[serde(default)]
    pub is_editing: bool,
}

struct Mounted {
    handle: StepHandle,
    step: Box<dyn PageStep>,
    resolution: Resolution,
}

/// Controlador del flujo de una instancia.
///
/// Invariantes:
/// - Siempre hay un paso montado al renderizar (registrado, primer paso o
///   placeholder).
/// - Cada montaje incrementa la generación; desmontar cancela todos los
///   timers de la generación anterior.
/// - Las peticiones de avance y los timers de una generación que ya no es la
///   actual se ignoran.
pub struct FlowController {
    registry: StepRegistry,
    config: EngineConfig,
    effects: Arc<dyn Effects>,
    scheduler: Scheduler,
    data: DataRecord,
    state: FlowState,
    generation: u64,
    mounted: Option<Mounted>,
    last_known: Option<String>,
    outbox: Vec<(String, Value)>,
    history: Vec<Transition>,
}

impl FlowController {
    /// Crea el controlador en el primer paso del registro (`p1` si está
    /// vacío). El paso se monta en el primer render/entrada.
    pub fn new(registry: StepRegistry, data: DataRecord) -> Self {
        let initial = registry.first_id().unwrap_or("p1").to_string();
        Self { registry,
               config: EngineConfig::default(),
               effects: Arc::new(NoopEffects),
               scheduler: Scheduler::new(),
               data,
               state: FlowState { current_step_id: initial, editing: false },
               generation: 0,
               mounted: None,
               last_known: None,
               outbox: Vec::new(),
               history: Vec::new() }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_effects(mut self, effects: Arc<dyn Effects>) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn data(&self) -> &DataRecord {
        &self.data
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Últimas transiciones, hasta `HISTORY_LIMIT`.
    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn elapsed(&self) -> Duration {
        self.scheduler.elapsed()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Handle del paso montado (si ya hay uno).
    pub fn handle(&self) -> Option<&StepHandle> {
        self.mounted.as_ref().map(|m| &m.handle)
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.mounted.as_ref().map(|m| &m.resolution)
    }

    /// Renderiza `step_id` en el modo indicado. Si el id o el modo cambian, el
    /// paso anterior se desmonta (cancelando sus timers) y se monta el nuevo.
    /// Repetir el mismo id desconocido que ya resolvió al primer paso no
    /// vuelve a montar nada.
    pub fn render(&mut self, step_id: &str, editing: bool) -> StepView {
        let same_step = self.is_showing(step_id);
        if !same_step || editing != self.state.editing || self.mounted.is_none() {
            if !same_step {
                self.record(Transition::Navigated { to: step_id.to_string() });
            }
            self.state.current_step_id = step_id.to_string();
            self.state.editing = editing;
            self.mount();
        }
        self.view()
    }

    /// Variante del contrato de props: los datos del padre sustituyen al
    /// registro actual antes de renderizar.
    pub fn render_props(&mut self, props: &RenderProps) -> StepView {
        if props.data != self.data {
            self.data = props.data.clone();
        }
        self.render(&props.page_id, props.is_editing)
    }

    /// Si `step_id` es lo que ya se muestra, directamente o como id pedido
    /// que se resolvió al primer paso.
    fn is_showing(&self, step_id: &str) -> bool {
        if step_id == self.state.current_step_id {
            return true;
        }
        matches!(self.resolution(), Some(Resolution::FirstStep { requested }) if requested == step_id)
    }

    /// Vista del paso actual, montándolo si hace falta.
    pub fn view(&mut self) -> StepView {
        self.ensure_mounted();
        match &self.mounted {
            Some(m) => m.step.view(&self.data, self.state.editing),
            None => PlaceholderStep::new(self.state.current_step_id.clone()).view(&self.data, self.state.editing),
        }
    }

    /// Transición pura al id indicado. Un id desconocido se resuelve en el
    /// montaje según la política de fallback.
    pub fn advance_to(&mut self, step_id: &str) {
        self.record(Transition::Navigated { to: step_id.to_string() });
        self.state.current_step_id = step_id.to_string();
        self.mount();
    }

    /// `onAdvance` de un paso concreto. Devuelve `false` si el handle ya no es
    /// el actual (la petición se ignora).
    pub fn on_advance(&mut self, handle: &StepHandle) -> bool {
        if self.handle() != Some(handle) {
            log::debug!("avance ignorado: el paso {} (gen {}) ya no es el actual",
                        handle.step_id(),
                        handle.generation());
            return false;
        }
        self.next_in_sequence();
        true
    }

    /// Fusiona `{ field: value }` en el registro de datos y lo deja en la
    /// bandeja de salida para el adaptador de persistencia.
    pub fn update_field(&mut self, field: &str, value: Value) {
        self.data.merge(field, value.clone());
        self.outbox.push((field.to_string(), value));
    }

    /// Actualizaciones pendientes de persistir, fusionadas en un registro
    /// parcial (la última escritura de cada campo gana).
    pub fn take_pending_updates(&mut self) -> DataRecord {
        let mut partial = DataRecord::new();
        for (field, value) in self.outbox.drain(..) {
            partial.merge(field, value);
        }
        partial
    }

    pub fn has_pending_updates(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Activa o desactiva el modo edición. El paso actual se desmonta (sus
    /// timers se cancelan) y se vuelve a montar en el nuevo modo.
    pub fn set_editing(&mut self, editing: bool) {
        if self.state.editing == editing && self.mounted.is_some() {
            return;
        }
        self.state.editing = editing;
        self.mount();
    }

    /// Carga otra instancia: nuevos datos, estado inicial, sin pendientes.
    pub fn reset(&mut self, data: DataRecord) {
        self.unmount();
        self.data = data;
        self.outbox.clear();
        self.history.clear();
        self.last_known = None;
        self.state = FlowState { current_step_id: self.registry.first_id().unwrap_or("p1").to_string(),
                                 editing: false };
        self.mount();
    }

    /// Entrega una entrada del host al paso montado.
    pub fn dispatch(&mut self, input: StepInput) {
        self.ensure_mounted();
        let intents = self.with_step(|step, ctx| step.handle(&input, ctx));
        self.apply_intents(intents, false);
    }

    /// Avanza el reloj virtual `by`, disparando en orden los timers vencidos.
    pub fn advance_time(&mut self, by: Duration) {
        self.ensure_mounted();
        let deadline = self.scheduler.elapsed() + by;
        while let Some(fired) = self.scheduler.pop_due(deadline) {
            self.deliver_timer(fired);
        }
        self.scheduler.advance_to(deadline);
    }

    /// Entrega un timer vencido. Un timer de otra generación se descarta
    /// aunque no se hubiera cancelado. Devuelve si se entregó.
    pub fn deliver_timer(&mut self, fired: FiredTimer) -> bool {
        if fired.generation != self.generation || self.mounted.is_none() {
            log::debug!("timer '{}' obsoleto (gen {}, actual {}) ignorado",
                        fired.tag,
                        fired.generation,
                        self.generation);
            return false;
        }
        if fired.tag == ADVANCE_TAG {
            if self.state.editing {
                return false;
            }
            self.next_in_sequence();
            return true;
        }
        let input = StepInput::Timer(fired.tag);
        let intents = self.with_step(|step, ctx| step.handle(&input, ctx));
        self.apply_intents(intents, true);
        true
    }

    fn ensure_mounted(&mut self) {
        if self.mounted.is_none() {
            self.mount();
        }
    }

    fn unmount(&mut self) {
        if let Some(m) = self.mounted.take() {
            let cancelled = self.scheduler.cancel_generation(m.handle.generation());
            log::debug!("paso {} desmontado ({} timers cancelados)", m.handle.step_id(), cancelled);
        }
    }

    fn mount(&mut self) {
        self.unmount();
        self.generation += 1;
        let requested = self.state.current_step_id.clone();
        let editing = self.state.editing;
        let (step, resolution) = match self.registry.lookup(&requested) {
            Some(entry) => (entry.build(&self.data, editing, &self.config), Resolution::Registered),
            None => match (self.registry.fallback_mode(), self.registry.first()) {
                (FallbackMode::FirstStep, Some(first)) => {
                    log::warn!("plantilla '{}': paso '{}' desconocido, se muestra '{}'",
                               self.registry.slug(),
                               requested,
                               first.id());
                    self.state.current_step_id = first.id().to_string();
                    (first.build(&self.data, editing, &self.config), Resolution::FirstStep { requested })
                }
                _ => {
                    log::warn!("plantilla '{}': paso '{}' no enlazado", self.registry.slug(), requested);
                    (Box::new(PlaceholderStep::new(requested.clone())) as Box<dyn PageStep>,
                     Resolution::Placeholder { requested })
                }
            },
        };
        if !matches!(resolution, Resolution::Placeholder { .. }) {
            self.last_known = Some(self.state.current_step_id.clone());
        }
        let handle = StepHandle::new(self.generation, self.state.current_step_id.clone());
        log::debug!("montando paso {} (gen {})", handle.step_id(), handle.generation());
        self.mounted = Some(Mounted { handle, step, resolution });
        let intents = self.with_step(|step, ctx| step.mount(ctx));
        self.apply_intents(intents, false);
    }

    fn with_step<F>(&mut self, f: F) -> Vec<StepIntent>
        where F: FnOnce(&mut dyn PageStep, &mut StepContext<'_>)
    {
        let Some(mut mounted) = self.mounted.take() else {
            return Vec::new();
        };
        let mut intents = Vec::new();
        {
            let mut ctx = StepContext::new(&mounted.handle,
                                           &self.data,
                                           self.state.editing,
                                           &mut self.scheduler,
                                           &mut intents);
            f(mounted.step.as_mut(), &mut ctx);
        }
        self.mounted = Some(mounted);
        intents
    }

    fn apply_intents(&mut self, intents: Vec<StepIntent>, from_timer: bool) {
        let generation = self.generation;
        for intent in intents {
            let stale = self.generation != generation;
            match intent {
                StepIntent::UpdateField { field, value } => self.update_field(&field, value),
                StepIntent::Advance if stale => {
                    log::debug!("avance duplicado ignorado (gen {})", generation);
                }
                StepIntent::Advance if from_timer && self.state.editing => {
                    log::debug!("avance por timer ignorado en modo edición");
                }
                StepIntent::Advance => self.next_in_sequence(),
                StepIntent::Effect(effect) if !stale => self.effects.trigger(&effect),
                StepIntent::Effect(_) => {}
                StepIntent::Reload if stale => {}
                StepIntent::Reload => {
                    if self.registry.is_last(&self.state.current_step_id) {
                        self.reload();
                    } else {
                        log::warn!("recarga pedida desde '{}', que no es el último paso", self.state.current_step_id);
                    }
                }
            }
        }
    }

    /// Decide el siguiente paso en orden del registro. Desde el último paso
    /// se ejecuta la acción terminal (recarga).
    fn next_in_sequence(&mut self) {
        let from = self.state.current_step_id.clone();
        let anchor = match self.resolution() {
            Some(Resolution::Placeholder { .. }) => self.last_known.clone(),
            _ => Some(from.clone()),
        };
        let next = match &anchor {
            Some(a) => self.registry.next_after(a).map(|s| s.to_string()),
            None => self.registry.first_id().map(|s| s.to_string()),
        };
        match next {
            Some(to) => {
                log::info!("plantilla '{}': {} -> {}", self.registry.slug(), from, to);
                self.record(Transition::Advanced { from, to: to.clone() });
                self.state.current_step_id = to;
                self.mount();
            }
            None if anchor.is_some() => self.reload(),
            None => {
                log::warn!("plantilla '{}' sin pasos: nada a lo que avanzar", self.registry.slug());
            }
        }
    }

    fn record(&mut self, transition: Transition) {
        if self.history.len() >= HISTORY_LIMIT {
            let excess = self.history.len() + 1 - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        self.history.push(transition);
    }

    fn reload(&mut self) {
        let from = self.state.current_step_id.clone();
        log::info!("plantilla '{}': fin de la experiencia desde '{}', recargando", self.registry.slug(), from);
        self.effects.trigger(&Effect::Reload);
        self.record(Transition::Reloaded { from });
        self.state.current_step_id = self.registry.first_id().unwrap_or("p1").to_string();
        self.mount();
    }
}
