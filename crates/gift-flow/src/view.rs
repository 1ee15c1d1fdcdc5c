// Archivo: view.rs
// Propósito: salida "headless" de un paso. Un host (CLI, navegador) dibuja
// `StepView`; el motor no conoce estilos ni animaciones.
use gift_domain::StepType;
use serde::Serialize;
use serde_json::Value;

/// Recurso usado cuando una imagen falta, está malformada o falló al cargar.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    Step(StepType),
    Placeholder,
}

/// Affordance de edición en línea: el prompt inicial es el valor actual o el
/// valor por defecto del campo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditAffordance {
    pub field: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub field: String,
    pub label: String,
    pub value: Value,
    pub from_default: bool,
    pub edit: Option<EditAffordance>,
}

impl FieldView {
    /// Valor como texto para mostrar. Las listas se unen con " | ".
    pub fn display(&self) -> String {
        display_value(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub field: String,
    pub src: String,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionView {
    pub id: String,
    pub label: String,
}

/// Descripción completa de lo que muestra un paso en un instante.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub step_id: String,
    pub kind: ViewKind,
    pub title: String,
    pub editing: bool,
    pub fields: Vec<FieldView>,
    pub images: Vec<ImageView>,
    pub actions: Vec<ActionView>,
    pub status: Option<String>,
}

impl StepView {
    pub fn new(step_id: impl Into<String>, kind: ViewKind, title: impl Into<String>, editing: bool) -> Self {
        Self { step_id: step_id.into(),
               kind,
               title: title.into(),
               editing,
               fields: Vec::new(),
               images: Vec::new(),
               actions: Vec::new(),
               status: None }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn push_field(&mut self, field: FieldView) {
        self.fields.push(field);
    }

    pub fn push_image(&mut self, image: ImageView) {
        self.images.push(image);
    }

    pub fn push_action(&mut self, id: impl Into<String>, label: impl Into<String>) {
        let id = id.into();
        if !self.has_action(&id) {
            self.actions.push(ActionView { id, label: label.into() });
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Texto mostrado para `name`, si el paso lo muestra.
    pub fn text(&self, name: &str) -> Option<String> {
        self.field(name).map(|f| f.display())
    }

    pub fn has_action(&self, id: &str) -> bool {
        self.actions.iter().any(|a| a.id == id)
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == ViewKind::Placeholder
    }
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(" | "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
