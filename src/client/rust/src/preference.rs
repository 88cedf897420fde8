/* src/client/rust/src/preference.rs */

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Client-local preferences that survive page loads.
pub trait PreferenceStore: Send + Sync {
  fn locale(&self) -> Option<String>;

  fn set_locale(&self, locale: &str) -> Result<(), ClientError>;
}

#[derive(Default)]
pub struct MemoryPreferences {
  locale: RwLock<Option<String>>,
}

impl MemoryPreferences {
  pub fn with_locale(locale: &str) -> Self {
    Self { locale: RwLock::new(Some(locale.to_string())) }
  }
}

impl PreferenceStore for MemoryPreferences {
  fn locale(&self) -> Option<String> {
    self.locale.read().clone()
  }

  fn set_locale(&self, locale: &str) -> Result<(), ClientError> {
    *self.locale.write() = Some(locale.to_string());
    Ok(())
  }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  locale: Option<String>,
}

/// Preferences kept as a small JSON file.
pub struct FilePreferences {
  path: PathBuf,
}

impl FilePreferences {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  // Missing or unreadable files count as empty.
  fn read(&self) -> Preferences {
    let Ok(content) = std::fs::read(&self.path) else {
      return Preferences::default();
    };
    serde_json::from_slice(&content).unwrap_or_else(|e| {
      tracing::debug!(path = %self.path.display(), error = %e, "ignoring malformed preferences");
      Preferences::default()
    })
  }

  fn io_err(&self, source: std::io::Error) -> ClientError {
    ClientError::Preferences { path: self.path.display().to_string(), source }
  }
}

impl PreferenceStore for FilePreferences {
  fn locale(&self) -> Option<String> {
    self.read().locale
  }

  fn set_locale(&self, locale: &str) -> Result<(), ClientError> {
    let mut prefs = self.read();
    prefs.locale = Some(locale.to_string());
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
    }
    let body = serde_json::to_vec_pretty(&prefs).map_err(|e| self.io_err(e.into()))?;
    std::fs::write(&self.path, body).map_err(|e| self.io_err(e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_round_trip_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = FilePreferences::new(dir.path().join(".vessel/preferences.json"));
    assert_eq!(prefs.locale(), None);
    prefs.set_locale("zh-CN").unwrap();
    assert_eq!(prefs.locale().as_deref(), Some("zh-CN"));
    assert_eq!(FilePreferences::new(prefs.path()).locale().as_deref(), Some("zh-CN"));
  }

  #[test]
  fn malformed_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "not json").unwrap();
    let prefs = FilePreferences::new(&path);
    assert_eq!(prefs.locale(), None);
    prefs.set_locale("en").unwrap();
    assert_eq!(prefs.locale().as_deref(), Some("en"));
  }

  #[test]
  fn memory_store() {
    let prefs = MemoryPreferences::with_locale("fr");
    assert_eq!(prefs.locale().as_deref(), Some("fr"));
    prefs.set_locale("en").unwrap();
    assert_eq!(prefs.locale().as_deref(), Some("en"));
  }
}
