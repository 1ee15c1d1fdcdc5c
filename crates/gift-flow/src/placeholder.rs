// Archivo: placeholder.rs
// Propósito: paso "Page Not Linked" mostrado para ids desconocidos cuando la
// plantilla usa `FallbackMode::Placeholder`.
use crate::step::{PageStep, StepContext, StepInput};
use crate::view::{StepView, ViewKind};
use gift_domain::DataRecord;

pub const SKIP_ACTION: &str = "skip";

pub struct PlaceholderStep {
    requested: String,
}

impl PlaceholderStep {
    pub fn new(requested: impl Into<String>) -> Self {
        Self { requested: requested.into() }
    }
}

impl PageStep for PlaceholderStep {
    fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
        if let StepInput::Action(id) = input {
            if id == SKIP_ACTION {
                ctx.advance();
            }
        }
    }

    fn view(&self, _data: &DataRecord, editing: bool) -> StepView {
        let mut view = StepView::new(self.requested.clone(), ViewKind::Placeholder, "Page Not Linked", editing)
            .with_status(format!("The page '{}' is not linked to this template yet.", self.requested));
        view.push_action(SKIP_ACTION, "Skip Module");
        view
    }
}
