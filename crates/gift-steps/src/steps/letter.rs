use crate::common::{base_view, finish_view, handle_editing, is_action, NEXT};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};

const OPEN: &str = "open";

/// Carta en un sobre: primero se abre, después se puede seguir.
pub struct LetterStep {
  definition: StepDefinition,
  opened: bool,
  fields: Vec<FieldSpec>,
}

impl LetterStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    Self { definition: props.definition.clone(),
           opened: false,
           fields: vec![FieldSpec::text("letter", "Letter", "Every moment with you is my favourite."),
                        FieldSpec::text("senderName", "From", "Yours, always")] }
  }
}

impl PageStep for LetterStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    if is_action(input, OPEN) {
      self.opened = true;
    } else if is_action(input, NEXT) && self.opened {
      ctx.advance();
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let mut view = base_view(&self.definition, editing);
    if self.opened || editing {
      view.push_action(NEXT, "Next");
      finish_view(view, &self.fields, data)
    } else {
      view.push_action(OPEN, "Open the envelope");
      finish_view(view.with_status("Tap to open"), &[], data)
    }
  }
}
