use crate::common::{base_view, finish_view, handle_editing, is_action, NEXT};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{Effect, FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};

/// Celebración: confeti al montar y botón para seguir.
pub struct CelebrationStep {
  definition: StepDefinition,
  particles: u32,
  fields: Vec<FieldSpec>,
}

impl CelebrationStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    let particles = props.definition.config_u64("particles").unwrap_or(150) as u32;
    Self { definition: props.definition.clone(),
           particles,
           fields: vec![FieldSpec::text("greeting", "Greeting", "Happy Birthday!"),
                        FieldSpec::text("recipientName", "Recipient", "Dear friend")] }
  }
}

impl PageStep for CelebrationStep {
  fn mount(&mut self, ctx: &mut StepContext<'_>) {
    if !ctx.editing() {
      ctx.effect(Effect::Confetti { particles: self.particles });
      if let Some(cue) = self.definition.config_str("audio") {
        ctx.effect(Effect::Audio { cue: cue.to_string() });
      }
    }
  }

  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    if is_action(input, NEXT) {
      ctx.advance();
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let mut view = base_view(&self.definition, editing);
    let label = self.definition.config_str("buttonLabel").unwrap_or("Continue");
    view.push_action(NEXT, label);
    finish_view(view, &self.fields, data)
  }
}
