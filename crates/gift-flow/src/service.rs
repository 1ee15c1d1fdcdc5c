// Archivo: service.rs
// Propósito: implementar `GiftService`, la capa que une el almacén de datos
// con el controlador: crea instancias, abre sesiones de reproducción/edición
// y persiste en segundo plano las ediciones de campos.
use crate::config::EngineConfig;
use crate::controller::FlowController;
use crate::effects::{Effects, NoopEffects};
use crate::errors::Result;
use crate::registry::StepRegistry;
use crate::repository::DataStore;
use crate::step::StepInput;
use crate::timers::Scheduler;
use crate::view::StepView;
use gift_domain::{DataRecord, TemplateDefinition};
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use uuid::Uuid;

enum WriteCommand {
    Update(Uuid, DataRecord),
    Flush(Sender<()>),
}

/// Escritor en segundo plano: aplica actualizaciones parciales al almacén
/// sin bloquear al controlador. Los fallos se registran y se descartan; el
/// registro en memoria sigue siendo la fuente de verdad de la sesión.
pub struct WriteBehind {
    tx: Option<Sender<WriteCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl WriteBehind {
    pub fn spawn(store: Arc<dyn DataStore>) -> Self {
        let (tx, rx) = mpsc::channel::<WriteCommand>();
        let worker = thread::Builder::new().name("gift-write-behind".into())
                                           .spawn(move || run_writer(store, rx));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("no se pudo lanzar el escritor en segundo plano: {}", e);
                None
            }
        };
        let tx = worker.as_ref().map(|_| tx);
        Self { tx, worker }
    }

    /// Encola una actualización parcial (fire-and-forget).
    pub fn submit(&self, instance_id: Uuid, partial: DataRecord) {
        if partial.is_empty() {
            return;
        }
        match &self.tx {
            Some(tx) => {
                if tx.send(WriteCommand::Update(instance_id, partial)).is_err() {
                    log::warn!("escritor detenido; actualización de {} descartada", instance_id);
                }
            }
            None => log::warn!("sin escritor; actualización de {} descartada", instance_id),
        }
    }

    /// Espera a que se apliquen las escrituras encoladas hasta ahora.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if tx.send(WriteCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for WriteBehind {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_writer(store: Arc<dyn DataStore>, rx: Receiver<WriteCommand>) {
    for cmd in rx {
        match cmd {
            WriteCommand::Update(id, partial) => match store.update(&id, &partial) {
                Ok(()) => log::debug!("instancia {}: {} campos persistidos", id, partial.len()),
                Err(e) => log::warn!("no se pudo persistir la instancia {}: {}", id, e),
            },
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// Servicio de alto nivel sobre instancias de regalo.
///
/// Esta capa orquesta el almacén y el controlador. Está pensada para ser
/// invocada desde la CLI o desde un handler HTTP.
pub struct GiftService<S>
    where S: DataStore
{
    store: Arc<S>,
    config: EngineConfig,
    effects: Arc<dyn Effects>,
}

impl<S> GiftService<S> where S: DataStore + 'static
{
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config, effects: Arc::new(NoopEffects) }
    }

    pub fn with_effects(mut self, effects: Arc<dyn Effects>) -> Self {
        self.effects = effects;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Crea una instancia de `template` con los datos iniciales.
    pub fn create_instance(&self, template: &TemplateDefinition, data: DataRecord) -> Result<Uuid> {
        let id = self.store.create_instance(template.id, &data)?;
        log::info!("instancia {} creada para la plantilla '{}'", id, template.slug);
        Ok(id)
    }

    /// Datos de la instancia; cualquier fallo de carga produce un registro
    /// vacío para que los pasos usen sus valores por defecto.
    pub fn load_data(&self, instance_id: &Uuid) -> DataRecord {
        match self.store.get(instance_id) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("no se pudo cargar la instancia {} ({}); se usan valores por defecto", instance_id, e);
                DataRecord::new()
            }
        }
    }

    /// Abre una sesión sobre la instancia con el registro de pasos dado.
    pub fn open_session(&self, instance_id: Uuid, registry: StepRegistry) -> GiftSession {
        self.open_session_with_scheduler(instance_id, registry, Scheduler::new())
    }

    pub fn open_session_with_scheduler(&self,
                                       instance_id: Uuid,
                                       registry: StepRegistry,
                                       scheduler: Scheduler)
                                       -> GiftSession {
        let data = self.load_data(&instance_id);
        let controller = FlowController::new(registry, data).with_config(self.config.clone())
                                                            .with_effects(self.effects.clone())
                                                            .with_scheduler(scheduler);
        let persisted = controller.data().fingerprint();
        let store: Arc<dyn DataStore> = self.store.clone();
        GiftSession { instance_id, controller, writer: WriteBehind::spawn(store), persisted }
    }
}

/// Sesión de una instancia: el controlador más su escritor en segundo plano.
/// Tras cada operación las ediciones pendientes se envían al escritor, salvo
/// que el registro resultante tenga la misma huella que lo ya persistido.
pub struct GiftSession {
    instance_id: Uuid,
    controller: FlowController,
    writer: WriteBehind,
    /// Huella del registro tal como quedó en el almacén.
    persisted: String,
}

impl GiftSession {
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FlowController {
        &mut self.controller
    }

    pub fn view(&mut self) -> StepView {
        self.controller.view()
    }

    pub fn render(&mut self, step_id: &str, editing: bool) -> StepView {
        let view = self.controller.render(step_id, editing);
        self.sync();
        view
    }

    pub fn dispatch(&mut self, input: StepInput) {
        self.controller.dispatch(input);
        self.sync();
    }

    pub fn advance_time(&mut self, by: Duration) {
        self.controller.advance_time(by);
        self.sync();
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.controller.set_editing(editing);
        self.sync();
    }

    pub fn update_field(&mut self, field: &str, value: Value) {
        self.controller.update_field(field, value);
        self.sync();
    }

    /// Espera a que las ediciones enviadas se apliquen en el almacén.
    pub fn flush(&self) {
        self.writer.flush();
    }

    fn sync(&mut self) {
        if !self.controller.has_pending_updates() {
            return;
        }
        let partial = self.controller.take_pending_updates();
        let fingerprint = self.controller.data().fingerprint();
        if fingerprint == self.persisted {
            log::debug!("instancia {}: edición sin cambios, no se escribe", self.instance_id);
            return;
        }
        self.persisted = fingerprint;
        self.writer.submit(self.instance_id, partial);
    }
}
