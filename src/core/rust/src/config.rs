/* src/core/rust/src/config.rs */

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::i18n::{Catalogs, load_catalogs};
use crate::locale::LocaleSet;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VesselConfig {
  #[serde(default)]
  pub i18n: I18nSection,
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub client: ClientSection,
}

impl VesselConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.i18n.validate()?;
    if self.server.render_timeout_ms == 0 {
      return Err(ConfigError::Invalid("server.render_timeout_ms must be positive".into()));
    }
    if self.client.request_timeout_ms == 0 {
      return Err(ConfigError::Invalid("client.request_timeout_ms must be positive".into()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct I18nSection {
  #[serde(default = "default_locales")]
  pub locales: Vec<String>,
  #[serde(default = "default_locale")]
  pub default: String,
  pub messages_dir: Option<PathBuf>,
}

impl Default for I18nSection {
  fn default() -> Self {
    Self { locales: default_locales(), default: default_locale(), messages_dir: None }
  }
}

impl I18nSection {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.locales.is_empty() {
      return Err(ConfigError::Invalid("i18n.locales must not be empty".into()));
    }
    if !self.locales.contains(&self.default) {
      return Err(ConfigError::Invalid(format!(
        "i18n.default \"{}\" is not in i18n.locales {:?}",
        self.default, self.locales
      )));
    }
    Ok(())
  }

  pub fn locale_set(&self) -> Result<LocaleSet, ConfigError> {
    self.validate()?;
    LocaleSet::new(&self.locales, &self.default)
  }

  /// Catalogs from `messages_dir`, relative to `base`. Empty when no directory is set.
  pub fn catalogs(&self, base: &Path) -> Result<Catalogs, ConfigError> {
    match &self.messages_dir {
      Some(dir) => load_catalogs(&base.join(dir)),
      None => Ok(Catalogs::new()),
    }
  }
}

fn default_locales() -> Vec<String> {
  vec![default_locale()]
}

fn default_locale() -> String {
  "en".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_addr")]
  pub addr: String,
  #[serde(default = "default_template")]
  pub template: PathBuf,
  pub assets_dir: Option<PathBuf>,
  #[serde(default = "default_render_timeout_ms")]
  pub render_timeout_ms: u64,
  /// Concurrent renders allowed; `Some(0)` means unbounded, `None` the available parallelism.
  pub render_limit: Option<usize>,
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      addr: default_addr(),
      template: default_template(),
      assets_dir: None,
      render_timeout_ms: default_render_timeout_ms(),
      render_limit: None,
    }
  }
}

fn default_addr() -> String {
  "0.0.0.0:3000".to_string()
}

fn default_template() -> PathBuf {
  PathBuf::from("dist/index.html")
}

fn default_render_timeout_ms() -> u64 {
  3000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  pub preference_file: Option<PathBuf>,
  #[serde(default = "default_request_timeout_ms")]
  pub request_timeout_ms: u64,
}

impl Default for ClientSection {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      preference_file: None,
      request_timeout_ms: default_request_timeout_ms(),
    }
  }
}

fn default_base_url() -> String {
  "http://localhost:3000".to_string()
}

fn default_request_timeout_ms() -> u64 {
  10_000
}

pub fn parse_config(content: &str, path: &Path) -> Result<VesselConfig, ConfigError> {
  let config: VesselConfig = toml::from_str(content)
    .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?;
  config.validate()?;
  Ok(config)
}

pub fn load_config(path: &Path) -> Result<VesselConfig, ConfigError> {
  let content = std::fs::read_to_string(path)
    .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
  parse_config(&content, path)
}
