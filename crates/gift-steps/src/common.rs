// Helpers compartidos por los pasos concretos.
use gift_domain::StepDefinition;
use gift_flow::fields::apply_edit;
use gift_flow::{FieldSpec, StepContext, StepInput, StepView, ViewKind};
use std::time::Duration;

pub(crate) const CONTINUE: &str = "continue";
pub(crate) const NEXT: &str = "next";

/// Vista base: título de la definición o, si falta, el tipo de paso.
pub(crate) fn base_view(definition: &StepDefinition, editing: bool) -> StepView {
  let title = if definition.title.trim().is_empty() {
    definition.step_type.to_string()
  } else {
    definition.title.clone()
  };
  StepView::new(definition.id.clone(), ViewKind::Step(definition.step_type), title, editing)
}

/// Agrega los campos y, en edición, la acción "continue" para recorrer la
/// plantilla sin esperar timers ni interacciones.
pub(crate) fn finish_view(mut view: StepView, fields: &[FieldSpec], data: &gift_domain::DataRecord) -> StepView {
  for spec in fields {
    view.push_field(spec.view(data, view.editing));
  }
  if view.editing {
    view.push_action(CONTINUE, "Continue");
  }
  view
}

/// Ediciones en línea y "continue" en modo edición. Devuelve si la entrada
/// se consumió.
pub(crate) fn handle_editing(fields: &[FieldSpec], input: &StepInput, ctx: &mut StepContext<'_>) -> bool {
  if apply_edit(fields, input, ctx) {
    return true;
  }
  if ctx.editing() && is_action(input, CONTINUE) {
    ctx.advance();
    return true;
  }
  false
}

pub(crate) fn is_action(input: &StepInput, id: &str) -> bool {
  matches!(input, StepInput::Action(a) if a == id)
}

/// Duración en ms de `config[key]`, o `default_ms`.
pub(crate) fn config_ms(definition: &StepDefinition, key: &str, default_ms: u64) -> Duration {
  Duration::from_millis(definition.config_u64(key).unwrap_or(default_ms))
}
