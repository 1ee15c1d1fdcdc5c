use crate::common::{base_view, finish_view, handle_editing, NEXT};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};
use std::collections::BTreeSet;

const FLIP_PREFIX: &str = "flip:";

/// Cartas con motivos; "next" aparece cuando todas se dieron vuelta.
pub struct FlipCardsStep {
  definition: StepDefinition,
  flipped: BTreeSet<usize>,
  fields: Vec<FieldSpec>,
}

impl FlipCardsStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    Self { definition: props.definition.clone(),
           flipped: BTreeSet::new(),
           fields: vec![FieldSpec::list("reasons",
                                        "Reasons",
                                        &["Your smile", "The way you laugh", "How you make every day better"])] }
  }

  fn card_count(&self, data: &DataRecord) -> usize {
    self.fields[0].resolve_list(data).len()
  }

  fn all_flipped(&self, data: &DataRecord) -> bool {
    (0..self.card_count(data)).all(|i| self.flipped.contains(&i))
  }
}

impl PageStep for FlipCardsStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    let StepInput::Action(action) = input else {
      return;
    };
    if let Some(index) = action.strip_prefix(FLIP_PREFIX).and_then(|n| n.parse::<usize>().ok()) {
      if index < self.card_count(ctx.data()) {
        self.flipped.insert(index);
      }
    } else if action == NEXT && self.all_flipped(ctx.data()) {
      ctx.advance();
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let count = self.card_count(data);
    let mut view = base_view(&self.definition, editing).with_status(format!("{} / {} cards flipped",
                                                                            self.flipped.len(),
                                                                            count));
    for i in (0..count).filter(|i| !self.flipped.contains(i)) {
      view.push_action(format!("{}{}", FLIP_PREFIX, i), format!("Flip card {}", i + 1));
    }
    if self.all_flipped(data) {
      view.push_action(NEXT, "Next");
    }
    finish_view(view, &self.fields, data)
  }
}
