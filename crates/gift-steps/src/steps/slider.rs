use crate::common::{base_view, config_ms, finish_view, handle_editing};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{Effect, FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};
use std::time::Duration;

/// Slider continuo 0..=100. Al cruzar el umbral por primera vez lanza
/// confeti y avanza tras la celebración; nunca se completa dos veces.
pub struct SliderStep {
  definition: StepDefinition,
  value: f64,
  threshold: f64,
  celebrate: Duration,
  completed: bool,
  fields: Vec<FieldSpec>,
}

impl SliderStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    let threshold = props.definition
                         .config_f64("threshold")
                         .unwrap_or(props.config.slider_threshold)
                         .clamp(0.0, 100.0);
    Self { definition: props.definition.clone(),
           value: 0.0,
           threshold,
           celebrate: config_ms(props.definition, "celebrateMs", props.config.celebrate_ms),
           completed: false,
           fields: vec![FieldSpec::text("sliderPrompt", "Prompt", "Slide to show how much you're loved"),
                        FieldSpec::text("revealText", "Reveal", "To the moon and back!")] }
  }

  pub fn value(&self) -> f64 {
    self.value
  }

  pub fn completed(&self) -> bool {
    self.completed
  }
}

impl PageStep for SliderStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    let StepInput::Slider(v) = input else {
      return;
    };
    self.value = if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) };
    if !self.completed && self.value >= self.threshold {
      self.completed = true;
      ctx.effect(Effect::Confetti { particles: 100 });
      ctx.advance_after(self.celebrate);
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let view = base_view(&self.definition, editing).with_status(format!("{:.0}%", self.value));
    let fields: &[FieldSpec] = if self.completed || editing { &self.fields } else { &self.fields[..1] };
    finish_view(view, fields, data)
  }
}
