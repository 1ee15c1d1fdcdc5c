use crate::common::{base_view, finish_view, handle_editing, NEXT};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};
use serde_json::Value;

const PREV: &str = "prev";

/// Línea de tiempo. Las entradas pueden ser texto u objetos
/// `{ "date", "title" }`; "next" en la última avanza.
pub struct TimelineStep {
  definition: StepDefinition,
  index: usize,
  fields: Vec<FieldSpec>,
}

fn entry_label(entry: &Value) -> String {
  match entry {
    Value::String(s) => s.clone(),
    Value::Object(m) => {
      let title = m.get("title").and_then(|v| v.as_str()).unwrap_or("");
      match m.get("date").and_then(|v| v.as_str()) {
        Some(date) if !date.is_empty() => format!("{}: {}", date, title),
        _ => title.to_string(),
      }
    }
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

impl TimelineStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    Self { definition: props.definition.clone(),
           index: 0,
           fields: vec![FieldSpec::list("timeline",
                                        "Timeline",
                                        &["The day we met", "Our first adventure", "Today and every day after"])] }
  }

  fn entries(&self, data: &DataRecord) -> Vec<Value> {
    self.fields[0].resolve_list(data)
  }
}

impl PageStep for TimelineStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    let StepInput::Action(action) = input else {
      return;
    };
    let len = self.entries(ctx.data()).len();
    if action == NEXT {
      if self.index + 1 < len {
        self.index += 1;
      } else {
        ctx.advance();
      }
    } else if action == PREV {
      self.index = self.index.saturating_sub(1);
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let entries = self.entries(data);
    let mut view = base_view(&self.definition, editing);
    if let Some(entry) = entries.get(self.index.min(entries.len().saturating_sub(1))) {
      view = view.with_status(format!("{} / {}: {}", self.index + 1, entries.len(), entry_label(entry)));
    }
    if self.index > 0 {
      view.push_action(PREV, "Back");
    }
    view.push_action(NEXT, "Next");
    finish_view(view, &self.fields, data)
  }
}
