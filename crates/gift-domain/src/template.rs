// template.rs
use crate::{DataRecord, DomainError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Tipos de página soportados por el motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepType {
  Loading,
  Countdown,
  Celebration,
  Message,
  Photo,
  Game,
  Letter,
  Slider,
  FlipCards,
  Timeline,
  Character,
}

impl StepType {
  pub const ALL: [StepType; 11] = [StepType::Loading,
                                   StepType::Countdown,
                                   StepType::Celebration,
                                   StepType::Message,
                                   StepType::Photo,
                                   StepType::Game,
                                   StepType::Letter,
                                   StepType::Slider,
                                   StepType::FlipCards,
                                   StepType::Timeline,
                                   StepType::Character];

  pub fn as_str(&self) -> &'static str {
    match self {
      StepType::Loading => "loading",
      StepType::Countdown => "countdown",
      StepType::Celebration => "celebration",
      StepType::Message => "message",
      StepType::Photo => "photo",
      StepType::Game => "game",
      StepType::Letter => "letter",
      StepType::Slider => "slider",
      StepType::FlipCards => "flip-cards",
      StepType::Timeline => "timeline",
      StepType::Character => "character",
    }
  }
}

impl fmt::Display for StepType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for StepType {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim().to_lowercase();
    StepType::ALL.iter()
                 .copied()
                 .find(|t| t.as_str() == s)
                 .ok_or_else(|| DomainError::ValidationError(format!("tipo de paso desconocido: {}", s)))
  }
}

/// Política ante un id de paso que no está en el registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackMode {
  /// Se muestra el primer paso registrado.
  #[default]
  FirstStep,
  /// Se muestra "Page Not Linked" con una acción para saltar.
  Placeholder,
}

/// Definición declarativa de un paso dentro de una plantilla.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
  pub id: String,
  #[serde(rename = "type")]
  pub step_type: StepType,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub required_fields: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<Map<String, Value>>,
}

impl StepDefinition {
  pub fn new(id: impl Into<String>, step_type: StepType) -> Self {
    Self { id: id.into(), step_type, title: String::new(), required_fields: Vec::new(), config: None }
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = title.into();
    self
  }

  pub fn with_required(mut self, fields: &[&str]) -> Self {
    self.required_fields = fields.iter().map(|f| f.to_string()).collect();
    self
  }

  pub fn with_config(mut self, config: Value) -> Self {
    self.config = config.as_object().cloned();
    self
  }

  pub fn config_value(&self, key: &str) -> Option<&Value> {
    self.config.as_ref().and_then(|c| c.get(key))
  }

  pub fn config_u64(&self, key: &str) -> Option<u64> {
    self.config_value(key).and_then(|v| v.as_u64())
  }

  pub fn config_f64(&self, key: &str) -> Option<f64> {
    self.config_value(key).and_then(|v| v.as_f64())
  }

  pub fn config_str(&self, key: &str) -> Option<&str> {
    self.config_value(key).and_then(|v| v.as_str())
  }
}

/// Plantilla comprable: metadatos de tienda más la secuencia de pasos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
  pub id: i64,
  pub slug: String,
  pub title: String,
  pub category: String,
  pub price: f64,
  #[serde(default)]
  pub original_price: f64,
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub color: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tag: Option<String>,
  #[serde(default = "default_active")]
  pub is_active: bool,
  #[serde(default)]
  pub fallback_mode: FallbackMode,
  pub pages: Vec<StepDefinition>,
}

fn default_active() -> bool {
  true
}

impl TemplateDefinition {
  /// Verifica que la plantilla tenga pasos y que sus ids sean únicos y no
  /// vacíos.
  pub fn validate(&self) -> Result<(), DomainError> {
    if self.slug.trim().is_empty() {
      return Err(DomainError::ValidationError(format!("plantilla {} sin slug", self.id)));
    }
    if self.pages.is_empty() {
      return Err(DomainError::ValidationError(format!("plantilla '{}' sin páginas", self.slug)));
    }
    let mut seen = HashSet::new();
    for page in self.pages.iter() {
      if page.id.trim().is_empty() {
        return Err(DomainError::ValidationError(format!("plantilla '{}' tiene un paso sin id", self.slug)));
      }
      if !seen.insert(page.id.as_str()) {
        return Err(DomainError::ValidationError(format!("plantilla '{}': id de paso duplicado '{}'",
                                                        self.slug, page.id)));
      }
    }
    Ok(())
  }

  pub fn step(&self, id: &str) -> Option<&StepDefinition> {
    self.pages.iter().find(|p| p.id == id)
  }

  pub fn first_step_id(&self) -> Option<&str> {
    self.pages.first().map(|p| p.id.as_str())
  }

  /// Porcentaje de descuento respecto a `original_price`, redondeado.
  pub fn discount_percent(&self) -> u32 {
    if self.original_price <= 0.0 || self.price >= self.original_price {
      return 0;
    }
    (((self.original_price - self.price) / self.original_price) * 100.0).round() as u32
  }

  pub fn display_price(&self) -> String {
    format!("${:.2}", self.price)
  }

  /// Para cada paso, los `required_fields` que faltan en `data`. Solo
  /// informativo: el motor nunca bloquea por esto.
  pub fn missing_fields(&self, data: &DataRecord) -> Vec<(String, Vec<String>)> {
    self.pages
        .iter()
        .filter_map(|p| {
          let missing: Vec<String> = data.missing_fields(&p.required_fields).into_iter().map(String::from).collect();
          if missing.is_empty() {
            None
          } else {
            Some((p.id.clone(), missing))
          }
        })
        .collect()
  }
}

impl fmt::Display for TemplateDefinition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Template(id: {}, slug: {}, pages: {})", self.id, self.slug, self.pages.len())
  }
}
