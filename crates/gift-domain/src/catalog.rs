// catalog.rs
use crate::{DomainError, TemplateDefinition};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

static BUILTIN_JSON: &str = include_str!("../catalog/templates.json");

static BUILTIN: Lazy<Result<Vec<TemplateDefinition>, DomainError>> = Lazy::new(|| parse_templates(BUILTIN_JSON));

/// Registro remoto que sobrescribe metadatos de tienda de una plantilla.
/// Nunca toca la lista de páginas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOverride {
  pub template_id: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub original_price: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tag: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
}

/// Catálogo ordenado de plantillas.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
  templates: Vec<TemplateDefinition>,
}

impl Catalog {
  /// Catálogo embebido en el crate.
  pub fn builtin() -> Result<Self, DomainError> {
    match &*BUILTIN {
      Ok(t) => Ok(Self { templates: t.clone() }),
      Err(e) => Err(e.clone()),
    }
  }

  pub fn from_json(json: &str) -> Result<Self, DomainError> {
    Ok(Self { templates: parse_templates(json)? })
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DomainError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    Self::from_json(&raw)
  }

  pub fn from_templates(templates: Vec<TemplateDefinition>) -> Result<Self, DomainError> {
    validate_all(&templates)?;
    Ok(Self { templates })
  }

  pub fn templates(&self) -> &[TemplateDefinition] {
    &self.templates
  }

  pub fn len(&self) -> usize {
    self.templates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.templates.is_empty()
  }

  pub fn by_id(&self, id: i64) -> Option<&TemplateDefinition> {
    self.templates.iter().find(|t| t.id == id)
  }

  pub fn by_slug(&self, slug: &str) -> Option<&TemplateDefinition> {
    self.templates.iter().find(|t| t.slug == slug)
  }

  /// Como `by_slug`, pero un slug desconocido es `DomainError::NotFound`.
  pub fn require_slug(&self, slug: &str) -> Result<&TemplateDefinition, DomainError> {
    self.by_slug(slug)
        .ok_or_else(|| DomainError::NotFound(format!("plantilla '{}'", slug)))
  }

  pub fn active(&self) -> impl Iterator<Item = &TemplateDefinition> {
    self.templates.iter().filter(|t| t.is_active)
  }

  pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a TemplateDefinition> + 'a {
    self.active().filter(move |t| t.category.eq_ignore_ascii_case(category))
  }

  /// Categorías con al menos una plantilla activa, en orden de aparición.
  pub fn categories(&self) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for t in self.active() {
      if !out.contains(&t.category.as_str()) {
        out.push(t.category.as_str());
      }
    }
    out
  }

  /// Aplica overrides remotos indexados por id. Devuelve cuántos se
  /// aplicaron; los ids desconocidos se ignoran.
  pub fn apply_overrides(&mut self, overrides: &[TemplateOverride]) -> usize {
    let mut applied = 0;
    for ov in overrides {
      let Some(t) = self.templates.iter_mut().find(|t| t.id == ov.template_id) else {
        log::warn!("override para plantilla desconocida {}", ov.template_id);
        continue;
      };
      if let Some(title) = &ov.title {
        t.title = title.clone();
      }
      if let Some(price) = ov.price {
        t.price = price;
      }
      if let Some(original) = ov.original_price {
        t.original_price = original;
      }
      if let Some(tag) = &ov.tag {
        t.tag = if tag.is_empty() { None } else { Some(tag.clone()) };
      }
      if let Some(active) = ov.is_active {
        t.is_active = active;
      }
      applied += 1;
    }
    applied
  }
}

fn parse_templates(json: &str) -> Result<Vec<TemplateDefinition>, DomainError> {
  let templates: Vec<TemplateDefinition> = serde_json::from_str(json)?;
  validate_all(&templates)?;
  Ok(templates)
}

fn validate_all(templates: &[TemplateDefinition]) -> Result<(), DomainError> {
  let mut ids = std::collections::HashSet::new();
  for t in templates {
    t.validate()?;
    if !ids.insert(t.id) {
      return Err(DomainError::ValidationError(format!("id de plantilla duplicado: {}", t.id)));
    }
  }
  Ok(())
}
