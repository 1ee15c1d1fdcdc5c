use crate::common::{base_view, config_ms, finish_view, handle_editing, is_action};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{Effect, FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};
use std::time::Duration;

const DECORATE: &str = "decorate";
const LIGHT: &str = "light";
const HOLD: &str = "cake-hold";

/// Sub-estados internos del pastel. Sólo el último pide avanzar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CakeStage {
  Decorating { placed: u32 },
  Lighting,
  Celebrating,
  Finished,
}

/// Variante "cake" de la celebración: decorar, encender las velas y
/// celebrar durante `holdMs` antes de pasar al siguiente paso.
pub struct CakeStep {
  definition: StepDefinition,
  stage: CakeStage,
  toppings: u32,
  hold: Duration,
  fields: Vec<FieldSpec>,
}

impl CakeStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    let toppings = props.definition.config_u64("toppings").unwrap_or(3).max(1) as u32;
    Self { definition: props.definition.clone(),
           stage: CakeStage::Decorating { placed: 0 },
           toppings,
           hold: config_ms(props.definition, "holdMs", props.config.cake_hold_ms),
           fields: vec![FieldSpec::text("recipientName", "Recipient", "Birthday Star"),
                        FieldSpec::text("wishText", "Wish", "Make a wish and blow out the candles!")] }
  }

  pub fn stage(&self) -> CakeStage {
    self.stage
  }

  fn status(&self) -> String {
    match self.stage {
      CakeStage::Decorating { placed } => format!("Decorate the cake ({}/{})", placed, self.toppings),
      CakeStage::Lighting => "Light the candles".to_string(),
      CakeStage::Celebrating => "Celebrating!".to_string(),
      CakeStage::Finished => "Done".to_string(),
    }
  }
}

impl PageStep for CakeStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    match (self.stage, input) {
      (CakeStage::Decorating { placed }, _) if is_action(input, DECORATE) => {
        let placed = placed + 1;
        self.stage = if placed >= self.toppings { CakeStage::Lighting } else { CakeStage::Decorating { placed } };
      }
      (CakeStage::Lighting, _) if is_action(input, LIGHT) => {
        self.stage = CakeStage::Celebrating;
        ctx.effect(Effect::Confetti { particles: 200 });
        ctx.effect(Effect::Audio { cue: "happy-birthday".to_string() });
        if !ctx.editing() {
          ctx.schedule(self.hold, HOLD);
        }
      }
      (CakeStage::Celebrating, StepInput::Timer(tag)) if tag == HOLD => {
        self.stage = CakeStage::Finished;
        ctx.advance();
      }
      _ => log::debug!("pastel {}: entrada {:?} ignorada en {:?}", self.definition.id, input, self.stage),
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let mut view = base_view(&self.definition, editing).with_status(self.status());
    match self.stage {
      CakeStage::Decorating { .. } => view.push_action(DECORATE, "Add topping"),
      CakeStage::Lighting => view.push_action(LIGHT, "Light the candles"),
      CakeStage::Celebrating | CakeStage::Finished => {}
    }
    finish_view(view, &self.fields, data)
  }
}
