use crate::common::{base_view, finish_view, handle_editing, is_action, NEXT};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};

/// Mensaje final o intermedio con saludo, texto y firma.
pub struct MessageStep {
  definition: StepDefinition,
  fields: Vec<FieldSpec>,
}

impl MessageStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    Self { definition: props.definition.clone(),
           fields: vec![FieldSpec::text("greeting", "Greeting", "Happy Birthday!"),
                        FieldSpec::text("message", "Message", "Wishing you a day as wonderful as you are."),
                        FieldSpec::text("senderName", "From", "Someone who loves you")] }
  }
}

impl PageStep for MessageStep {
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
    view.push_action(NEXT, "Next");
    finish_view(view, &self.fields, data)
  }
}
