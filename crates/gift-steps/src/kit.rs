use crate::steps::*;
use gift_domain::{Catalog, StepType, TemplateDefinition};
use gift_flow::{FlowError, PageStep, StepFactory, StepProps, StepRegistry};
use std::sync::Arc;

/// Fábrica de los pasos estándar: elige la implementación según el tipo de
/// la definición (y `config.variant` para la celebración).
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSteps;

impl StepFactory for StandardSteps {
  fn build(&self, props: &StepProps<'_>) -> Box<dyn PageStep> {
    match props.definition.step_type {
      StepType::Loading => Box::new(LoadingStep::new(props)),
      StepType::Countdown => Box::new(CountdownStep::new(props)),
      StepType::Celebration if props.definition.config_str("variant") == Some("cake") => Box::new(CakeStep::new(props)),
      StepType::Celebration => Box::new(CelebrationStep::new(props)),
      StepType::Photo => Box::new(PhotoStep::new(props)),
      StepType::Message => Box::new(MessageStep::new(props)),
      StepType::Game => Box::new(GameStep::new(props)),
      StepType::Letter => Box::new(LetterStep::new(props)),
      StepType::Slider => Box::new(SliderStep::new(props)),
      StepType::FlipCards => Box::new(FlipCardsStep::new(props)),
      StepType::Timeline => Box::new(TimelineStep::new(props)),
      StepType::Character => Box::new(CharacterStep::new(props)),
    }
  }
}

/// Registro de pasos de una plantilla con la fábrica estándar.
pub fn build_registry(template: &TemplateDefinition) -> StepRegistry {
  StepRegistry::from_template(template, Arc::new(StandardSteps))
}

/// Busca la plantilla por slug en el catálogo y construye su registro.
pub fn registry_for_slug(catalog: &Catalog, slug: &str) -> Result<StepRegistry, FlowError> {
  Ok(build_registry(catalog.require_slug(slug)?))
}
