// Archivo: fields.rs
// Propósito: resolución de campos `data[field] ?? default`, affordances de
// edición y sustitución de imágenes rotas. Compartido por todos los pasos.
use crate::step::{StepContext, StepInput};
use crate::view::{display_value, EditAffordance, FieldView, ImageView, PLACEHOLDER_IMAGE};
use gift_domain::DataRecord;
use serde_json::Value;
use std::collections::HashSet;

/// Campo mostrado por un paso con su valor por defecto integrado.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub default: Value,
    pub editable: bool,
}

impl FieldSpec {
    pub fn text(name: &'static str, label: &'static str, default: &str) -> Self {
        Self { name, label, default: Value::String(default.to_string()), editable: true }
    }

    pub fn list(name: &'static str, label: &'static str, default: &[&str]) -> Self {
        let items = default.iter().map(|s| Value::String(s.to_string())).collect();
        Self { name, label, default: Value::Array(items), editable: true }
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Vista del campo. En edición incluye el prompt con el valor actual.
    pub fn view(&self, data: &DataRecord, editing: bool) -> FieldView {
        let resolved = data.resolve(self.name, &self.default);
        let edit = if editing && self.editable {
            Some(EditAffordance { field: self.name.to_string(), prompt: display_value(&resolved.value) })
        } else {
            None
        };
        FieldView { field: self.name.to_string(),
                    label: self.label.to_string(),
                    value: resolved.value,
                    from_default: resolved.from_default,
                    edit }
    }

    pub fn resolve_text(&self, data: &DataRecord) -> String {
        display_value(&data.resolve(self.name, &self.default).value)
    }

    pub fn resolve_list(&self, data: &DataRecord) -> Vec<Value> {
        match data.resolve(self.name, &self.default).value {
            Value::Array(items) => items,
            other => vec![other],
        }
    }

    /// Adapta el valor editado al tipo del campo: para listas, un texto se
    /// divide por `|`.
    pub fn coerce(&self, value: &Value) -> Value {
        match (&self.default, value) {
            (Value::Array(_), Value::String(s)) => {
                Value::Array(s.split('|').map(|p| p.trim()).filter(|p| !p.is_empty()).map(|p| Value::String(p.to_string())).collect())
            }
            (Value::String(_), Value::String(_)) => value.clone(),
            (Value::String(_), Value::Null) => Value::String(String::new()),
            (Value::String(_), other) => Value::String(display_value(other)),
            _ => value.clone(),
        }
    }
}

/// Atiende una edición en línea si corresponde a uno de `specs`. Fuera del
/// modo edición las ediciones se ignoran. Devuelve si la entrada se consumió.
pub fn apply_edit(specs: &[FieldSpec], input: &StepInput, ctx: &mut StepContext<'_>) -> bool {
    let StepInput::Edit { field, value } = input else {
        return false;
    };
    if !ctx.editing() {
        log::debug!("edición de '{}' ignorada fuera del modo edición", field);
        return true;
    }
    match specs.iter().find(|s| s.name == field.as_str() && s.editable) {
        Some(spec) => {
            ctx.update_field(field, spec.coerce(value));
            true
        }
        None => {
            log::debug!("campo '{}' no editable en este paso", field);
            true
        }
    }
}

/// Resuelve una fuente de imagen. Si falta, no es texto, está vacía o ya
/// falló al cargar, se usa el placeholder.
pub fn image(field: &str, value: Option<&Value>, failed: &HashSet<String>) -> ImageView {
    match value.and_then(|v| v.as_str()).map(str::trim) {
        Some(src) if !src.is_empty() && !failed.contains(src) => {
            ImageView { field: field.to_string(), src: src.to_string(), placeholder: false }
        }
        _ => ImageView { field: field.to_string(), src: PLACEHOLDER_IMAGE.to_string(), placeholder: true },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn editing_exposes_prompt_with_default() {
        let spec = FieldSpec::text("greeting", "Greeting", "Happy Birthday!");
        let view = spec.view(&DataRecord::new(), true);
        assert!(view.from_default);
        assert_eq!(view.edit.unwrap().prompt, "Happy Birthday!");
        assert!(spec.view(&DataRecord::new(), false).edit.is_none());
    }

    #[test]
    fn list_edits_split_on_pipe() {
        let spec = FieldSpec::list("photos", "Photos", &[]);
        assert_eq!(spec.coerce(&json!("a.jpg | b.jpg|")), json!(["a.jpg", "b.jpg"]));
    }

    #[test]
    fn broken_images_use_placeholder() {
        let mut failed = HashSet::new();
        assert!(image("photo", None, &failed).placeholder);
        assert!(image("photo", Some(&json!(12)), &failed).placeholder);
        assert!(!image("photo", Some(&json!("a.jpg")), &failed).placeholder);
        failed.insert("a.jpg".to_string());
        assert_eq!(image("photo", Some(&json!("a.jpg")), &failed).src, PLACEHOLDER_IMAGE);
    }
}
