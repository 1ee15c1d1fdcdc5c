use gift_domain::{Catalog, DataRecord, DomainError};
use gift_flow::{DataStore, EngineConfig, FlowController, FlowError, GiftService, InMemoryDataStore, RecordingEffects,
                Resolution, StepInput, Transition};
use gift_steps::{build_registry, registry_for_slug};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn catalog() -> Catalog {
  Catalog::builtin().unwrap()
}

#[test]
fn birthday_plays_from_start_to_reload() {
  let effects = Arc::new(RecordingEffects::new());
  let registry = registry_for_slug(&catalog(), "birthday-surprise").unwrap();
  let mut c = FlowController::new(registry, DataRecord::new()).with_effects(effects.clone());

  assert_eq!(c.view().step_id, "p1");
  c.advance_time(Duration::from_millis(4000));
  assert_eq!(c.state().current_step_id, "p2");

  c.dispatch(StepInput::action("open"));
  assert_eq!(c.state().current_step_id, "p3");
  for _ in 0..3 {
    c.dispatch(StepInput::action("decorate"));
  }
  c.dispatch(StepInput::action("light"));
  c.advance_time(Duration::from_millis(3000));
  assert_eq!(c.state().current_step_id, "p4");

  c.dispatch(StepInput::action("continue"));
  c.dispatch(StepInput::Slider(100.0));
  c.advance_time(Duration::from_millis(800));
  assert_eq!(c.state().current_step_id, "p6");

  c.dispatch(StepInput::action("next"));
  assert_eq!(effects.reloads(), 1);
  assert_eq!(c.state().current_step_id, "p1");
  assert!(matches!(c.history().last(), Some(Transition::Reloaded { from }) if from == "p6"));
}

#[test]
fn first_step_fallback_template() {
  let registry = registry_for_slug(&catalog(), "anniversary-light").unwrap();
  let mut c = FlowController::new(registry, DataRecord::new());
  let view = c.render("p42", false);
  assert_eq!(view.step_id, "p1");
  assert!(matches!(c.resolution(), Some(Resolution::FirstStep { .. })));
}

#[test]
fn placeholder_template_resumes_after_last_known_step() {
  let registry = registry_for_slug(&catalog(), "our-story").unwrap();
  let mut c = FlowController::new(registry, DataRecord::new());
  c.view();
  c.advance_time(Duration::from_millis(1800));
  assert_eq!(c.state().current_step_id, "p2");

  let view = c.render("p42", false);
  assert!(view.is_placeholder());
  c.dispatch(StepInput::action("skip"));
  assert_eq!(c.state().current_step_id, "p3");
}

#[test]
fn unknown_slug_is_not_found() {
  assert!(matches!(registry_for_slug(&catalog(), "nope"),
                   Err(FlowError::Domain(DomainError::NotFound(_)))));
}

#[test]
fn every_catalog_template_builds_a_full_registry() {
  for template in catalog().templates() {
    let registry = build_registry(template);
    assert_eq!(registry.len(), template.pages.len());
    assert_eq!(registry.fallback_mode(), template.fallback_mode);
  }
}

#[test]
fn session_persists_edits_made_in_editing_mode() {
  let store = Arc::new(InMemoryDataStore::new());
  let service = GiftService::new(store.clone(), EngineConfig::default());
  let catalog = catalog();
  let template = catalog.by_slug("valentine-quest").unwrap();
  let id = service.create_instance(template, DataRecord::from_value(json!({ "letter": "Be mine" })))
                  .unwrap();

  let mut session = service.open_session(id, build_registry(template));
  session.render("p5", true);
  session.dispatch(StepInput::edit("greeting", json!("Happy Valentine's, Sam")));
  session.flush();

  let saved = store.get(&id).unwrap();
  assert_eq!(saved.get("greeting"), Some(&json!("Happy Valentine's, Sam")));
  assert_eq!(saved.get("letter"), Some(&json!("Be mine")));
  assert_eq!(session.view().text("greeting").as_deref(), Some("Happy Valentine's, Sam"));
}
