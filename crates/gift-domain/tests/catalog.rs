use gift_domain::{Catalog, DataRecord, DomainError, FallbackMode, StepType, TemplateOverride};
use serde_json::json;

#[test]
fn builtin_catalog_loads_and_validates() {
  let catalog = Catalog::builtin().expect("builtin catalog");
  assert!(catalog.len() >= 5);
  let birthday = catalog.by_slug("birthday-surprise").expect("birthday");
  assert_eq!(birthday.first_step_id(), Some("p1"));
  assert_eq!(birthday.pages[0].step_type, StepType::Loading);
  assert_eq!(birthday.pages[0].config_u64("delayMs"), Some(4000));
  assert_eq!(catalog.by_slug("our-story").unwrap().fallback_mode, FallbackMode::Placeholder);
  assert_eq!(catalog.by_slug("anniversary-light").unwrap().fallback_mode, FallbackMode::FirstStep);
}

#[test]
fn inactive_templates_are_hidden_from_storefront() {
  let catalog = Catalog::builtin().unwrap();
  assert!(catalog.by_slug("classic-card").is_some());
  assert!(catalog.active().all(|t| t.slug != "classic-card"));
  assert!(catalog.by_category("BIRTHDAY").all(|t| t.category == "birthday"));
  assert_eq!(catalog.categories(), vec!["birthday", "anniversary", "valentine"]);
}

#[test]
fn unknown_slug_is_not_found() {
  let catalog = Catalog::builtin().unwrap();
  assert_eq!(catalog.require_slug("birthday-surprise").unwrap().id,
             catalog.by_slug("birthday-surprise").unwrap().id);
  match catalog.require_slug("nope") {
    Err(DomainError::NotFound(msg)) => assert!(msg.contains("nope")),
    other => panic!("expected NotFound, got {:?}", other.map(|t| t.slug.clone())),
  }
}

#[test]
fn duplicate_step_ids_are_rejected() {
  let json = r#"[{"id": 9, "slug": "dup", "title": "Dup", "category": "x", "price": 1.0,
                  "pages": [{"id": "p1", "type": "loading"}, {"id": "p1", "type": "message"}]}]"#;
  match Catalog::from_json(json) {
    Err(DomainError::ValidationError(msg)) => assert!(msg.contains("p1")),
    other => panic!("expected validation error, got {:?}", other),
  }
}

#[test]
fn empty_pages_and_unknown_types_fail_to_load() {
  let empty = r#"[{"id": 9, "slug": "e", "title": "E", "category": "x", "price": 1.0, "pages": []}]"#;
  assert!(matches!(Catalog::from_json(empty), Err(DomainError::ValidationError(_))));
  let unknown = r#"[{"id": 9, "slug": "u", "title": "U", "category": "x", "price": 1.0,
                     "pages": [{"id": "p1", "type": "hologram"}]}]"#;
  assert!(matches!(Catalog::from_json(unknown), Err(DomainError::SerializationError(_))));
}

#[test]
fn overrides_replace_storefront_metadata_only() {
  let mut catalog = Catalog::builtin().unwrap();
  let pages_before = catalog.by_id(1).unwrap().pages.clone();
  let applied = catalog.apply_overrides(&[TemplateOverride { template_id: 1,
                                                             price: Some(3.49),
                                                             is_active: Some(false),
                                                             ..Default::default() },
                                          TemplateOverride { template_id: 999, ..Default::default() }]);
  assert_eq!(applied, 1);
  let t = catalog.by_id(1).unwrap();
  assert_eq!(t.price, 3.49);
  assert!(!t.is_active);
  assert_eq!(t.pages, pages_before);
}

#[test]
fn discount_and_missing_fields_report() {
  let catalog = Catalog::builtin().unwrap();
  let t = catalog.by_slug("birthday-surprise").unwrap();
  assert_eq!(t.discount_percent(), 50);
  assert_eq!(t.display_price(), "$4.99");
  let data = DataRecord::from_value(json!({"recipientName": "Ana", "photos": ["a.jpg"]}));
  let missing = t.missing_fields(&data);
  assert!(missing.iter().any(|(id, f)| id == "p2" && f == &vec!["targetDate".to_string()]));
  assert!(missing.iter().all(|(id, _)| id != "p4"));
}

#[test]
fn step_type_parses_kebab_case() {
  assert_eq!("flip-cards".parse::<StepType>().unwrap(), StepType::FlipCards);
  assert_eq!(StepType::FlipCards.to_string(), "flip-cards");
  assert!("nope".parse::<StepType>().is_err());
}
