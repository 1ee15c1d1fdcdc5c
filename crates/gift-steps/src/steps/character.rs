use crate::common::{base_view, finish_view, handle_editing, is_action, NEXT};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};

const TAP: &str = "tap";

/// Personaje que recita su diálogo línea a línea; tras la última, avanza.
pub struct CharacterStep {
  definition: StepDefinition,
  line: usize,
  fields: Vec<FieldSpec>,
}

impl CharacterStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    Self { definition: props.definition.clone(),
           line: 0,
           fields: vec![FieldSpec::text("characterName", "Character", "Cupid"),
                        FieldSpec::list("dialogue",
                                        "Dialogue",
                                        &["Hi there!", "I have something special for you...", "Let's go!"])] }
  }

  fn lines(&self, data: &DataRecord) -> Vec<String> {
    self.fields[1].resolve_list(data).iter().map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())).collect()
  }
}

impl PageStep for CharacterStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    if is_action(input, NEXT) || is_action(input, TAP) {
      if self.line + 1 < self.lines(ctx.data()).len() {
        self.line += 1;
      } else {
        ctx.advance();
      }
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let lines = self.lines(data);
    let name = self.fields[0].resolve_text(data);
    let mut view = base_view(&self.definition, editing);
    if let Some(line) = lines.get(self.line.min(lines.len().saturating_sub(1))) {
      view = view.with_status(format!("{}: {}", name, line));
    }
    let last = self.line + 1 >= lines.len();
    view.push_action(NEXT, if last { "Let's go" } else { "Next" });
    finish_view(view, &self.fields, data)
  }
}
