#![allow(dead_code)]
use gift_domain::{DataRecord, FallbackMode, StepDefinition, StepType, TemplateDefinition};
use gift_flow::{FieldSpec, PageStep, StepContext, StepFactory, StepInput, StepProps, StepRegistry, StepView, ViewKind};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Auto-advances after `delayMs` (loading-like).
pub struct TimerStep {
  id: String,
  delay: Duration,
}

impl PageStep for TimerStep {
  fn mount(&mut self, ctx: &mut StepContext<'_>) {
    ctx.advance_after(self.delay);
  }
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if input == &StepInput::action("continue") && ctx.editing() {
      ctx.advance();
    }
  }
  fn view(&self, _data: &DataRecord, editing: bool) -> StepView {
    StepView::new(self.id.clone(), ViewKind::Step(StepType::Loading), "loading", editing)
  }
}

/// Advances on "next"; "double" calls advance twice in one go; "reload"
/// asks for the terminal action.
pub struct ButtonStep {
  id: String,
}

impl PageStep for ButtonStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    match input {
      StepInput::Action(a) if a == "next" => ctx.advance(),
      StepInput::Action(a) if a == "double" => {
        ctx.advance();
        ctx.advance();
      }
      StepInput::Action(a) if a == "reload" => ctx.reload(),
      _ => {}
    }
  }
  fn view(&self, _data: &DataRecord, editing: bool) -> StepView {
    let mut v = StepView::new(self.id.clone(), ViewKind::Step(StepType::Celebration), "button", editing);
    v.push_action("next", "Next");
    v
  }
}

/// Shows an editable greeting.
pub struct GreetingStep {
  id: String,
  fields: Vec<FieldSpec>,
}

impl PageStep for GreetingStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if gift_flow::fields::apply_edit(&self.fields, input, ctx) {
      return;
    }
    if input == &StepInput::action("next") {
      ctx.advance();
    }
  }
  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let mut v = StepView::new(self.id.clone(), ViewKind::Step(StepType::Message), "greeting", editing);
    for f in self.fields.iter() {
      v.push_field(f.view(data, editing));
    }
    v
  }
}

pub struct TestSteps;

impl StepFactory for TestSteps {
  fn build(&self, props: &StepProps<'_>) -> Box<dyn PageStep> {
    let id = props.definition.id.clone();
    match props.definition.step_type {
      StepType::Loading => {
        let ms = props.definition.config_u64("delayMs").unwrap_or(props.config.loading_delay_ms);
        Box::new(TimerStep { id, delay: Duration::from_millis(ms) })
      }
      StepType::Message => {
        Box::new(GreetingStep { id, fields: vec![FieldSpec::text("greeting", "Greeting", "Happy Birthday!")] })
      }
      _ => Box::new(ButtonStep { id }),
    }
  }
}

pub fn template(fallback: FallbackMode, pages: Vec<StepDefinition>) -> TemplateDefinition {
  TemplateDefinition { id: 1,
                       slug: "test".into(),
                       title: "Test".into(),
                       category: "birthday".into(),
                       price: 1.0,
                       original_price: 2.0,
                       icon: String::new(),
                       color: String::new(),
                       tag: None,
                       is_active: true,
                       fallback_mode: fallback,
                       pages }
}

pub fn loading(id: &str, ms: u64) -> StepDefinition {
  StepDefinition::new(id, StepType::Loading).with_config(json!({ "delayMs": ms }))
}

pub fn button(id: &str) -> StepDefinition {
  StepDefinition::new(id, StepType::Celebration)
}

pub fn greeting(id: &str) -> StepDefinition {
  StepDefinition::new(id, StepType::Message).with_required(&["greeting"])
}

pub fn registry(fallback: FallbackMode, pages: Vec<StepDefinition>) -> StepRegistry {
  StepRegistry::from_template(&template(fallback, pages), Arc::new(TestSteps))
}
