/* src/core/rust/src/i18n.rs */

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::errors::ConfigError;
use crate::locale::{Locale, LocaleSet};

/// Locale -> flat or nested message map.
pub type Catalogs = BTreeMap<String, serde_json::Map<String, Value>>;

/// Read every `<locale>.json` file in `dir`.
pub fn load_catalogs(dir: &Path) -> Result<Catalogs, ConfigError> {
  let io_err = |source| ConfigError::Io { path: dir.display().to_string(), source };
  let mut catalogs = Catalogs::new();
  for entry in std::fs::read_dir(dir).map_err(io_err)? {
    let path = entry.map_err(io_err)?.path();
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
      continue;
    }
    let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
      continue;
    };
    let content = std::fs::read_to_string(&path)
      .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    let messages: serde_json::Map<String, Value> = serde_json::from_str(&content)
      .map_err(|source| ConfigError::Catalog { path: path.display().to_string(), source })?;
    catalogs.insert(name.to_string(), messages);
  }
  Ok(catalogs)
}

/// Active-locale binding plus message lookup for one render tree.
#[derive(Clone)]
pub struct I18n {
  locales: LocaleSet,
  catalogs: Arc<Catalogs>,
  active: Arc<RwLock<Locale>>,
}

impl I18n {
  pub fn new(locales: LocaleSet, catalogs: Arc<Catalogs>, initial: &str) -> Self {
    let active = locales.resolve(initial);
    Self { locales, catalogs, active: Arc::new(RwLock::new(active)) }
  }

  pub fn locales(&self) -> &LocaleSet {
    &self.locales
  }

  pub fn active_locale(&self) -> Locale {
    self.active.read().clone()
  }

  pub fn set_active_locale(&self, locale: &Locale) {
    *self.active.write() = locale.clone();
  }

  /// Messages for the active locale, used when templates need the whole catalog.
  pub fn active_catalog(&self) -> Value {
    let active = self.active_locale();
    let mut merged =
      self.catalogs.get(self.locales.default_locale().as_str()).cloned().unwrap_or_default();
    if let Some(own) = self.catalogs.get(active.as_str()) {
      merged.extend(own.clone());
    }
    Value::Object(merged)
  }

  /// Translate a dotted key: active catalog, then the default catalog, then the key itself.
  pub fn t(&self, key: &str) -> String {
    let active = self.active_locale();
    [active.as_str(), self.locales.default_locale().as_str()]
      .iter()
      .find_map(|loc| self.catalogs.get(*loc).and_then(|c| lookup(c, key)))
      .unwrap_or_else(|| key.to_string())
  }
}

fn lookup(catalog: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
  if let Some(Value::String(s)) = catalog.get(key) {
    return Some(s.clone());
  }
  let mut parts = key.split('.');
  let mut current = catalog.get(parts.next()?)?;
  for part in parts {
    current = current.get(part)?;
  }
  current.as_str().map(String::from)
}
