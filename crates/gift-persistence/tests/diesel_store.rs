use gift_domain::{DataRecord, TemplateOverride};
use gift_flow::{DataStore, EngineConfig, FlowError, GiftService, StepInput, TemplateOverrideSource};
use gift_persistence::{new_from_env, DieselDataStore};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

// Base SQLite temporaria en archivo; se borra al terminar el test.
struct TempDb {
  path: PathBuf,
}

impl TempDb {
  fn new() -> Self {
    Self { path: std::env::temp_dir().join(format!("giftflow_test_{}.db", Uuid::new_v4())) }
  }

  fn url(&self) -> String {
    self.path.to_str().unwrap().to_string()
  }
}

impl Drop for TempDb {
  fn drop(&mut self) {
    for suffix in ["", "-wal", "-shm"] {
      let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
    }
  }
}

#[test]
fn instance_lifecycle() {
  let db = TempDb::new();
  let store = DieselDataStore::new(&db.url()).expect("store");

  let a = store.create_instance(1, &DataRecord::from_value(json!({ "greeting": "Hola" }))).unwrap();
  let b = store.create_instance(4, &DataRecord::new()).unwrap();

  let got = store.get_instance(&a).unwrap();
  assert_eq!(got.template_id, 1);
  assert_eq!(got.data.get("greeting"), Some(&json!("Hola")));

  store.update(&a, &DataRecord::from_value(json!({ "senderName": "Leo" }))).unwrap();
  let data = store.get(&a).unwrap();
  assert_eq!(data.get("greeting"), Some(&json!("Hola")));
  assert_eq!(data.get("senderName"), Some(&json!("Leo")));
  assert!(store.get_instance(&a).unwrap().updated_at >= got.updated_at);

  store.save(&a, &DataRecord::from_value(json!({ "photos": ["a.jpg"] }))).unwrap();
  assert!(store.get(&a).unwrap().get("greeting").is_none());

  let ids: Vec<Uuid> = store.list_instances().unwrap().into_iter().map(|i| i.id).collect();
  assert_eq!(ids.len(), 2);
  assert!(ids.contains(&a) && ids.contains(&b));

  store.delete_instance(&b).unwrap();
  assert!(matches!(store.get_instance(&b), Err(FlowError::NotFound(_))));
  assert!(matches!(store.delete_instance(&b), Err(FlowError::NotFound(_))));
  assert!(matches!(store.update(&b, &DataRecord::new()), Err(FlowError::NotFound(_))));
  assert!(matches!(store.save(&b, &DataRecord::new()), Err(FlowError::NotFound(_))));
}

#[test]
fn overrides_are_upserted_per_template() {
  let db = TempDb::new();
  let store = DieselDataStore::new(&db.url()).expect("store");
  store.put_override(&TemplateOverride { template_id: 3, price: Some(1.99), ..Default::default() }).unwrap();
  store.put_override(&TemplateOverride { template_id: 1, tag: Some("Sale".into()), ..Default::default() })
       .unwrap();
  store.put_override(&TemplateOverride { template_id: 3, is_active: Some(false), ..Default::default() })
       .unwrap();

  let overrides = store.list_overrides().unwrap();
  assert_eq!(overrides.iter().map(|o| o.template_id).collect::<Vec<_>>(), vec![1, 3]);
  assert_eq!(overrides[1].price, None);
  assert_eq!(overrides[1].is_active, Some(false));
}

#[test]
fn data_survives_reopening_the_database() {
  let db = TempDb::new();
  let id = {
    let store = DieselDataStore::new(&db.url()).unwrap();
    store.create_instance(2, &DataRecord::from_value(json!({ "letter": "Querida" }))).unwrap()
  };
  let store = DieselDataStore::new(&db.url()).unwrap();
  assert_eq!(store.get(&id).unwrap().get("letter"), Some(&json!("Querida")));
}

#[test]
fn session_writes_through_the_diesel_store() {
  let db = TempDb::new();
  let store = Arc::new(DieselDataStore::new(&db.url()).unwrap());
  let service = GiftService::new(store.clone(), EngineConfig::default());
  let catalog = gift_domain::Catalog::builtin().unwrap();
  let template = catalog.by_slug("birthday-surprise").unwrap();
  let id = service.create_instance(template, DataRecord::new()).unwrap();

  let mut session = service.open_session(id, gift_flow::StepRegistry::new(&template.slug, template.fallback_mode));
  session.set_editing(true);
  session.update_field("recipientName", json!("Mia"));
  session.dispatch(StepInput::action("continue"));
  session.flush();

  assert_eq!(store.get(&id).unwrap().get("recipientName"), Some(&json!("Mia")));
}

#[test]
fn env_url_selects_the_database() {
  let db = TempDb::new();
  std::env::set_var("GIFTFLOW_DB_URL", db.url());
  let store = new_from_env().expect("store from env");
  let id = store.create_instance(5, &DataRecord::new()).unwrap();
  assert_eq!(store.get_instance(&id).unwrap().template_id, 5);
  assert!(db.path.exists());
}
