mod common;

use common::{button, greeting, loading, registry};
use gift_domain::{DataRecord, FallbackMode};
use gift_flow::{Effect, FlowController, RecordingEffects, RenderProps, Resolution, Scheduler, StepInput, Transition,
                ADVANCE_TAG, HISTORY_LIMIT};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn advances(c: &FlowController) -> usize {
  c.history().iter().filter(|t| matches!(t, Transition::Advanced { .. })).count()
}

#[test]
fn unknown_id_falls_back_to_first_step() {
  let reg = registry(FallbackMode::FirstStep, vec![button("p1"), button("p2"), button("p3")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  let view = c.render("p99", false);
  assert_eq!(view.step_id, "p1");
  assert!(!view.is_placeholder());
  assert_eq!(c.state().current_step_id, "p1");
  assert_eq!(c.resolution(), Some(&Resolution::FirstStep { requested: "p99".into() }));
}

#[test]
fn rerendering_same_unknown_id_keeps_first_step_mounted() {
  let reg = registry(FallbackMode::FirstStep, vec![loading("p1", 4000), button("p2")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  c.render("p99", false);
  let generation = c.generation();

  c.advance_time(Duration::from_millis(3000));
  assert_eq!(c.render("p99", false).step_id, "p1");
  assert_eq!(c.generation(), generation);
  assert_eq!(c.history(), &[Transition::Navigated { to: "p99".into() }]);

  c.advance_time(Duration::from_millis(1000));
  assert_eq!(c.state().current_step_id, "p2");
}

#[test]
fn unknown_id_remounts_when_editing_changes() {
  let reg = registry(FallbackMode::FirstStep, vec![loading("p1", 4000), button("p2")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  c.render("p99", false);
  assert_eq!(c.pending_timers(), 1);
  let view = c.render("p99", true);
  assert_eq!(view.step_id, "p1");
  assert!(view.editing);
  assert_eq!(c.pending_timers(), 0);
}

#[test]
fn unknown_id_placeholder_skip_advances_exactly_once() {
  let reg = registry(FallbackMode::Placeholder, vec![button("p1"), button("p2"), button("p3")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  let view = c.render("p99", false);
  assert!(view.is_placeholder());
  assert_eq!(view.title, "Page Not Linked");
  assert!(view.has_action("skip"));

  c.dispatch(StepInput::action("skip"));
  assert_eq!(advances(&c), 1);
  assert_eq!(c.state().current_step_id, "p1");
}

#[test]
fn placeholder_skip_resumes_after_last_known_step() {
  let reg = registry(FallbackMode::Placeholder, vec![button("p1"), button("p2"), button("p3")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  c.render("p2", false);
  c.render("p42", false);
  c.dispatch(StepInput::action("skip"));
  assert_eq!(c.state().current_step_id, "p3");
}

#[test]
fn empty_registry_still_renders_something() {
  let reg = registry(FallbackMode::FirstStep, vec![]);
  let mut c = FlowController::new(reg, DataRecord::new());
  assert!(c.view().is_placeholder());
  c.dispatch(StepInput::action("skip"));
  assert!(c.view().is_placeholder());
}

#[test]
fn double_advance_from_same_step_moves_once() {
  let reg = registry(FallbackMode::FirstStep, vec![button("p1"), button("p2"), button("p3")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  c.render("p1", false);
  let handle = c.handle().cloned().expect("mounted");
  assert!(c.on_advance(&handle));
  assert!(!c.on_advance(&handle));
  assert_eq!(c.state().current_step_id, "p2");

  c.dispatch(StepInput::action("double"));
  assert_eq!(c.state().current_step_id, "p3");
  assert_eq!(advances(&c), 2);
}

#[test]
fn superseded_step_timer_never_advances() {
  let reg = registry(FallbackMode::FirstStep, vec![loading("p1", 4000), button("p2"), button("p3")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  c.render("p1", false);
  let old_generation = c.generation();
  assert_eq!(c.pending_timers(), 1);

  c.advance_time(Duration::from_millis(100));
  c.advance_to("p3");
  assert_eq!(c.pending_timers(), 0);

  c.advance_time(Duration::from_millis(3900));
  assert_eq!(c.state().current_step_id, "p3");
  assert_eq!(advances(&c), 0);

  // Even a timer that escaped cancellation is dropped by the generation guard.
  let mut stray = Scheduler::new();
  stray.schedule(old_generation, Duration::ZERO, ADVANCE_TAG);
  let fired = stray.pop_due(Duration::ZERO).unwrap();
  assert!(!c.deliver_timer(fired));
  assert_eq!(c.state().current_step_id, "p3");
}

#[test]
fn update_field_round_trips_into_next_render() {
  let reg = registry(FallbackMode::FirstStep, vec![greeting("p1")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  let before = c.render("p1", false);
  assert_eq!(before.text("greeting").as_deref(), Some("Happy Birthday!"));
  assert!(before.field("greeting").unwrap().from_default);

  c.update_field("greeting", json!("Hi"));
  let after = c.render("p1", false);
  assert_eq!(after.text("greeting").as_deref(), Some("Hi"));

  let pending = c.take_pending_updates();
  assert_eq!(pending.get("greeting"), Some(&json!("Hi")));
  assert!(!c.has_pending_updates());
}

#[test]
fn inline_edit_goes_through_update_field() {
  let reg = registry(FallbackMode::FirstStep, vec![greeting("p1")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  let view = c.render("p1", true);
  assert_eq!(view.field("greeting").unwrap().edit.as_ref().unwrap().prompt, "Happy Birthday!");
  c.dispatch(StepInput::edit("greeting", json!("Hola")));
  assert_eq!(c.data().get("greeting"), Some(&json!("Hola")));

  c.set_editing(false);
  c.dispatch(StepInput::edit("greeting", json!("ignored")));
  assert_eq!(c.data().get("greeting"), Some(&json!("Hola")));
}

#[test]
fn loading_then_button_reaches_reload() {
  let effects = Arc::new(RecordingEffects::new());
  let reg = registry(FallbackMode::FirstStep, vec![loading("p1", 4000), button("p2")]);
  let mut c = FlowController::new(reg, DataRecord::new()).with_effects(effects.clone());
  assert_eq!(c.render("p1", false).step_id, "p1");

  c.advance_time(Duration::from_millis(3999));
  assert_eq!(c.state().current_step_id, "p1");
  c.advance_time(Duration::from_millis(1));
  assert_eq!(c.state().current_step_id, "p2");

  c.dispatch(StepInput::action("next"));
  assert_eq!(effects.reloads(), 1);
  assert_eq!(c.history().last(), Some(&Transition::Reloaded { from: "p2".into() }));
  assert_eq!(c.state().current_step_id, "p1");
}

#[test]
fn history_stays_bounded_across_reload_cycles() {
  let reg = registry(FallbackMode::FirstStep, vec![button("p1"), button("p2")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  c.render("p1", false);
  for _ in 0..HISTORY_LIMIT {
    c.dispatch(StepInput::action("next"));
    c.dispatch(StepInput::action("next"));
  }
  assert_eq!(c.history().len(), HISTORY_LIMIT);
  assert_eq!(c.history().last(), Some(&Transition::Reloaded { from: "p2".into() }));
  assert_eq!(c.state().current_step_id, "p1");
}

#[test]
fn editing_disables_auto_advance_and_toggling_cancels_timers() {
  let reg = registry(FallbackMode::FirstStep, vec![loading("p1", 4000), button("p2")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  c.render("p1", true);
  assert_eq!(c.pending_timers(), 0);
  c.advance_time(Duration::from_secs(30));
  assert_eq!(c.state().current_step_id, "p1");

  c.set_editing(false);
  assert_eq!(c.pending_timers(), 1);
  c.set_editing(true);
  assert_eq!(c.pending_timers(), 0);
  c.set_editing(false);
  c.advance_time(Duration::from_millis(4000));
  assert_eq!(c.state().current_step_id, "p2");
}

#[test]
fn reload_is_only_honoured_on_last_step() {
  let effects = Arc::new(RecordingEffects::new());
  let reg = registry(FallbackMode::FirstStep, vec![button("p1"), button("p2")]);
  let mut c = FlowController::new(reg, DataRecord::new()).with_effects(effects.clone());
  c.render("p1", false);
  c.dispatch(StepInput::action("reload"));
  assert_eq!(effects.reloads(), 0);
  assert_eq!(c.state().current_step_id, "p1");

  c.render("p2", false);
  c.dispatch(StepInput::action("reload"));
  assert_eq!(effects.effects(), vec![Effect::Reload]);
}

#[test]
fn render_props_contract_replaces_data() {
  let reg = registry(FallbackMode::FirstStep, vec![greeting("p1"), button("p2")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  let props: RenderProps = serde_json::from_value(json!({
    "pageId": "p1",
    "data": { "greeting": "From props" },
    "isEditing": false
  })).unwrap();
  let view = c.render_props(&props);
  assert_eq!(view.text("greeting").as_deref(), Some("From props"));
  assert!(!view.editing);
}

#[test]
fn reset_starts_over_with_new_data() {
  let reg = registry(FallbackMode::FirstStep, vec![greeting("p1"), button("p2")]);
  let mut c = FlowController::new(reg, DataRecord::new());
  c.render("p2", true);
  c.update_field("x", json!(1));
  c.reset(DataRecord::from_value(json!({"greeting": "New"})));
  assert_eq!(c.state().current_step_id, "p1");
  assert!(!c.state().editing);
  assert!(!c.has_pending_updates());
  assert_eq!(c.view().text("greeting").as_deref(), Some("New"));
}
