use crate::common::{base_view, finish_view, handle_editing, CONTINUE};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::fields::image;
use gift_flow::{FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView};
use std::collections::HashSet;

const NEXT_PHOTO: &str = "next-photo";
const PREV_PHOTO: &str = "prev-photo";

/// Galería de fotos. Una imagen ausente, malformada o que falló al cargar
/// se muestra con el placeholder.
pub struct PhotoStep {
  definition: StepDefinition,
  index: usize,
  failed: HashSet<String>,
  fields: Vec<FieldSpec>,
}

impl PhotoStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    Self { definition: props.definition.clone(),
           index: 0,
           failed: HashSet::new(),
           fields: vec![FieldSpec::list("photos", "Photos", &[]),
                        FieldSpec::text("caption", "Caption", "Our favourite moments")] }
  }

  fn photos(&self, data: &DataRecord) -> Vec<serde_json::Value> {
    self.fields[0].resolve_list(data)
  }
}

impl PageStep for PhotoStep {
  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    let count = self.photos(ctx.data()).len().max(1);
    match input {
      StepInput::AssetFailed { src } => {
        log::warn!("foto '{}' no cargó; se usa el placeholder", src);
        self.failed.insert(src.clone());
      }
      StepInput::Action(a) if a == NEXT_PHOTO => self.index = (self.index + 1) % count,
      StepInput::Action(a) if a == PREV_PHOTO => self.index = (self.index + count - 1) % count,
      StepInput::Action(a) if a == CONTINUE => ctx.advance(),
      _ => {}
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let photos = self.photos(data);
    let mut view = base_view(&self.definition, editing);
    if photos.is_empty() {
      view.push_image(image("photos", None, &self.failed));
    } else {
      let index = self.index.min(photos.len() - 1);
      view.push_image(image("photos", photos.get(index), &self.failed));
      view = view.with_status(format!("{} / {}", index + 1, photos.len()));
      if photos.len() > 1 {
        view.push_action(PREV_PHOTO, "Previous");
        view.push_action(NEXT_PHOTO, "Next photo");
      }
    }
    view.push_action(CONTINUE, "Continue");
    finish_view(view, &self.fields, data)
  }
}
