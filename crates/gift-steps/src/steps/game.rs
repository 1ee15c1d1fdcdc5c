use crate::common::{base_view, config_ms, finish_view, handle_editing, is_action};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{Effect, FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

const POP: &str = "pop";

/// Modalidad del mini-juego según `config.mode`.
#[derive(Debug, Clone, PartialEq)]
pub enum GameMode {
  /// Tocar `target` veces.
  Tap { target: u32, count: u32 },
  /// Soltar cada elemento sobre su destino.
  Drag { pairs: BTreeMap<String, String>, placed: BTreeSet<String> },
}

impl GameMode {
  fn from_definition(definition: &StepDefinition) -> Self {
    if definition.config_str("mode") == Some("drag") {
      let pairs: BTreeMap<String, String> = definition.config_value("pairs")
                                                      .and_then(|v| v.as_object())
                                                      .map(|m| {
                                                        m.iter()
                                                         .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                                                         .collect()
                                                      })
                                                      .unwrap_or_default();
      let pairs = if pairs.is_empty() {
        BTreeMap::from([("heart".to_string(), "box".to_string())])
      } else {
        pairs
      };
      return GameMode::Drag { pairs, placed: BTreeSet::new() };
    }
    let target = definition.config_u64("target").unwrap_or(5).max(1) as u32;
    GameMode::Tap { target, count: 0 }
  }

  fn complete(&self) -> bool {
    match self {
      GameMode::Tap { target, count } => count >= target,
      GameMode::Drag { pairs, placed } => placed.len() == pairs.len(),
    }
  }

  fn progress(&self) -> String {
    match self {
      GameMode::Tap { target, count } => format!("{} / {} popped", count, target),
      GameMode::Drag { pairs, placed } => format!("{} / {} placed", placed.len(), pairs.len()),
    }
  }
}

/// Mini-juego: al completarlo hay confeti y avance tras `celebrateMs`.
pub struct GameStep {
  definition: StepDefinition,
  mode: GameMode,
  won: bool,
  celebrate: Duration,
  fields: Vec<FieldSpec>,
}

impl GameStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    Self { definition: props.definition.clone(),
           mode: GameMode::from_definition(props.definition),
           won: false,
           celebrate: config_ms(props.definition, "celebrateMs", props.config.celebrate_ms),
           fields: vec![FieldSpec::text("gameTitle", "Instructions", "Play to unlock your surprise"),
                        FieldSpec::text("prizeMessage", "Prize", "You did it!")] }
  }

  pub fn mode(&self) -> &GameMode {
    &self.mode
  }
}

impl PageStep for GameStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) || self.won {
      return;
    }
    match (&mut self.mode, input) {
      (GameMode::Tap { count, .. }, _) if is_action(input, POP) => *count += 1,
      (GameMode::Drag { pairs, placed }, StepInput::Drop { item, target }) => {
        if pairs.get(item) == Some(target) {
          placed.insert(item.clone());
        } else {
          log::debug!("juego {}: '{}' no va en '{}'", self.definition.id, item, target);
        }
      }
      _ => return,
    }
    if self.mode.complete() {
      self.won = true;
      ctx.effect(Effect::Confetti { particles: 120 });
      ctx.advance_after(self.celebrate);
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let mut view = base_view(&self.definition, editing).with_status(self.mode.progress());
    if !self.won {
      if let GameMode::Tap { .. } = self.mode {
        view.push_action(POP, "Pop!");
      }
    }
    finish_view(view, &self.fields, data)
  }
}
