use crate::common::{base_view, config_ms, finish_view, handle_editing, is_action};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gift_domain::{DataRecord, StepDefinition};
use gift_flow::{FieldSpec, PageStep, StepContext, StepInput, StepProps, StepView, TimerId};
use std::time::Duration;

const TICK: &str = "tick";
const OPEN: &str = "open";

/// Cuenta regresiva hasta `targetDate`. Sin fecha válida se considera
/// terminada y ofrece abrir el regalo directamente.
pub struct CountdownStep {
  definition: StepDefinition,
  poll: Duration,
  remaining: Option<chrono::Duration>,
  timer: Option<TimerId>,
  fields: Vec<FieldSpec>,
}

/// Acepta RFC 3339 o `YYYY-MM-DD` (medianoche UTC).
pub fn parse_target(value: &str) -> Option<DateTime<Utc>> {
  let value = value.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Some(dt.with_timezone(&Utc));
  }
  let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
  Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn format_remaining(left: chrono::Duration) -> String {
  format!("{}d {:02}h {:02}m {:02}s",
          left.num_days(),
          left.num_hours() % 24,
          left.num_minutes() % 60,
          left.num_seconds() % 60)
}

impl CountdownStep {
  pub fn new(props: &StepProps<'_>) -> Self {
    Self { definition: props.definition.clone(),
           poll: config_ms(props.definition, "pollMs", props.config.countdown_poll_ms),
           remaining: None,
           timer: None,
           fields: vec![FieldSpec::text("recipientName", "Recipient", "You"),
                        FieldSpec::text("targetDate", "Target date", ""),
                        FieldSpec::text("countdownTitle", "Headline", "Counting down to your special day")] }
  }

  fn done(&self) -> bool {
    self.remaining.map_or(true, |left| left <= chrono::Duration::zero())
  }

  fn refresh(&mut self, ctx: &mut StepContext<'_>) {
    let target = ctx.data().get("targetDate").and_then(|v| v.as_str()).and_then(parse_target);
    self.remaining = target.map(|t| (t - ctx.now()).max(chrono::Duration::zero()));
    // En edición se sigue sondeando para reflejar cambios de `targetDate`.
    if self.done() && !ctx.editing() {
      if let Some(id) = self.timer.take() {
        ctx.cancel(id);
      }
    }
  }
}

impl PageStep for CountdownStep {
  fn mount(&mut self, ctx: &mut StepContext<'_>) {
    self.refresh(ctx);
    if !self.done() || ctx.editing() {
      self.timer = Some(ctx.schedule_interval(self.poll, TICK));
    }
  }

  fn handle(&mut self, input: &StepInput, ctx: &mut StepContext<'_>) {
    if handle_editing(&self.fields, input, ctx) {
      return;
    }
    match input {
      StepInput::Timer(tag) if tag == TICK => self.refresh(ctx),
      _ if is_action(input, OPEN) && self.done() => ctx.advance(),
      _ => {}
    }
  }

  fn view(&self, data: &DataRecord, editing: bool) -> StepView {
    let status = match self.remaining {
      Some(left) if left > chrono::Duration::zero() => format_remaining(left),
      _ => "It's time!".to_string(),
    };
    let mut view = base_view(&self.definition, editing).with_status(status);
    if self.done() {
      view.push_action(OPEN, "Open your gift");
    }
    finish_view(view, &self.fields, data)
  }
}
