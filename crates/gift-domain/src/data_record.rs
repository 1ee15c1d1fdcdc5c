// data_record.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Contenido editable de una instancia de regalo: nombre de campo -> valor.
///
/// Los valores pueden ser texto, listas de texto u objetos anidados. No se
/// impone esquema: cada paso resuelve sus campos con `resolve` y cae a su
/// valor por defecto cuando el campo falta o tiene un tipo inesperado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord(Map<String, Value>);

/// Resultado de resolver un campo contra su valor por defecto.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
  pub value: Value,
  pub from_default: bool,
}

impl DataRecord {
  pub fn new() -> Self {
    Self(Map::new())
  }

  /// Construye el registro a partir de un JSON arbitrario. Cualquier cosa que
  /// no sea un objeto produce un registro vacío.
  pub fn from_value(value: Value) -> Self {
    match value {
      Value::Object(map) => Self(map),
      Value::Null => Self::new(),
      other => {
        log::warn!("registro de datos ignorado: se esperaba un objeto y llegó {}", type_name(&other));
        Self::new()
      }
    }
  }

  pub fn into_value(self) -> Value {
    Value::Object(self.0)
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.0.get(field).filter(|v| !v.is_null())
  }

  pub fn contains(&self, field: &str) -> bool {
    self.get(field).is_some()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(|k| k.as_str())
  }

  /// Inserta o reemplaza un campo. Es la única vía de mutación.
  pub fn merge(&mut self, field: impl Into<String>, value: Value) {
    self.0.insert(field.into(), value);
  }

  /// Aplica todos los campos de `partial` sobre este registro.
  pub fn merge_all(&mut self, partial: &DataRecord) {
    for (k, v) in partial.0.iter() {
      self.0.insert(k.clone(), v.clone());
    }
  }

  /// Resuelve `field` como `data[field] ?? default`. Un valor de tipo JSON
  /// distinto al del default se considera malformado y también cae al
  /// default. Un default `null` acepta cualquier valor.
  pub fn resolve(&self, field: &str, default: &Value) -> Resolved {
    match self.get(field) {
      Some(v) if same_kind(v, default) => Resolved { value: v.clone(), from_default: false },
      _ => Resolved { value: default.clone(), from_default: true },
    }
  }

  pub fn text_or(&self, field: &str, default: &str) -> String {
    match self.get(field) {
      Some(Value::String(s)) => s.clone(),
      Some(Value::Number(n)) => n.to_string(),
      _ => default.to_string(),
    }
  }

  /// Lista de textos. Los elementos que no son texto se descartan; si el
  /// campo no es un array se usa el default.
  pub fn list_or(&self, field: &str, default: &[&str]) -> Vec<String> {
    match self.get(field) {
      Some(Value::Array(items)) => items.iter().filter_map(|i| i.as_str().map(|s| s.to_string())).collect(),
      _ => default.iter().map(|s| s.to_string()).collect(),
    }
  }

  pub fn object(&self, field: &str) -> Option<&Map<String, Value>> {
    self.get(field).and_then(|v| v.as_object())
  }

  /// Campos de `required` ausentes en el registro (solo informativo).
  pub fn missing_fields<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
    required.iter().filter(|f| !self.contains(f)).map(|f| f.as_str()).collect()
  }

  /// Huella sha256 del contenido. El mapa está ordenado por clave, así que
  /// dos registros con el mismo contenido producen la misma huella.
  pub fn fingerprint(&self) -> String {
    let canonical = serde_json::to_string(&self.0).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
  }
}

impl From<Map<String, Value>> for DataRecord {
  fn from(map: Map<String, Value>) -> Self {
    Self(map)
  }
}

fn same_kind(value: &Value, default: &Value) -> bool {
  match (value, default) {
    (_, Value::Null) => true,
    (Value::String(_), Value::String(_)) => true,
    (Value::Array(_), Value::Array(_)) => true,
    (Value::Object(_), Value::Object(_)) => true,
    (Value::Number(_), Value::Number(_)) => true,
    (Value::Bool(_), Value::Bool(_)) => true,
    _ => false,
  }
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
