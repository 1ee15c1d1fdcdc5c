use crate::common::{base_view, finish_view, handle_editing};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};
use std::time::Duration;

/// Pantalla de carga: avanza sola tras `config.delayMs` (o el retardo del
/// motor). En edición no avanza.
pub struct LoadingStep {
  definition: StepDefinition,
  delay: Duration,
  fields: Vec<FieldSpec>,
}

impl LoadingStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    let delay = Duration::from_millis(props.definition
                                           .config_u64("delayMs")
                                           .unwrap_or(props.config.loading_delay_ms));
    Self { definition: props.definition.clone(),
           delay,
           fields: vec![FieldSpec::text("loadingText", "Loading text", "Something special is on its way...")] }
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }
}

impl PageStep for LoadingStep {
  fn mount(&mut self, ctx: &mut StepContext<'_>) {
    ctx.advance_after(self.delay);
  }

  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    handle_editing(&self.fields, input, ctx);
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let status = if editing { "Auto-advance paused while editing" } else { "Loading..." };
    finish_view(base_view(&self.definition, editing).with_status(status), &self.fields, data)
  }
}
