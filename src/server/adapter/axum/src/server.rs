/* src/server/adapter/axum/src/server.rs */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use vessel_core::{Catalogs, ConfigError, LocaleSet, RouteTable, VesselConfig};

use crate::data::{DataHandler, PageDataRegistry};
use crate::entry::ServerEntry;
use crate::render::{Renderer, TemplateRenderer};

pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(3);

/// Everything the router needs, split out of a [`VesselServer`].
pub struct VesselParts {
  pub entry: ServerEntry,
  pub registry: PageDataRegistry,
  pub template: String,
  pub assets_dir: Option<PathBuf>,
  pub render_timeout: Duration,
  /// `None` means unbounded.
  pub render_limit: Option<usize>,
}

pub struct VesselServer {
  locales: LocaleSet,
  catalogs: Catalogs,
  template: String,
  renderer: Option<Arc<dyn Renderer>>,
  routes: RouteTable,
  data: RouteTable<DataHandler>,
  assets_dir: Option<PathBuf>,
  render_timeout: Duration,
  render_limit: Option<usize>,
}

impl VesselServer {
  pub fn new(locales: LocaleSet, template: impl Into<String>) -> Self {
    Self {
      locales,
      catalogs: Catalogs::new(),
      template: template.into(),
      renderer: None,
      routes: RouteTable::new(),
      data: RouteTable::new(),
      assets_dir: None,
      render_timeout: DEFAULT_RENDER_TIMEOUT,
      render_limit: None,
    }
  }

  /// Locales, catalogs, template, assets and render limits from a loaded config.
  /// Relative paths resolve against `base`.
  pub fn from_config(config: &VesselConfig, base: &Path) -> Result<Self, ConfigError> {
    let template_path = base.join(&config.server.template);
    let template = std::fs::read_to_string(&template_path)
      .map_err(|source| ConfigError::Io { path: template_path.display().to_string(), source })?;
    let mut server = Self::new(config.i18n.locale_set()?, template)
      .catalogs(config.i18n.catalogs(base)?)
      .render_timeout(Duration::from_millis(config.server.render_timeout_ms))
      .render_limit(config.server.render_limit);
    if let Some(ref dir) = config.server.assets_dir {
      server = server.assets_dir(base.join(dir));
    }
    Ok(server)
  }

  pub fn catalogs(mut self, catalogs: Catalogs) -> Self {
    self.catalogs = catalogs;
    self
  }

  pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
    self.renderer = Some(Arc::new(renderer));
    self
  }

  /// A route rendered on the server without page data.
  pub fn route(mut self, pattern: &str) -> Result<Self, ConfigError> {
    self.routes.insert(pattern, ())?;
    Ok(self)
  }

  /// A route whose page data comes from `handler`, on first render and on `/__ssr_data`.
  pub fn page_data(mut self, pattern: &str, handler: DataHandler) -> Result<Self, ConfigError> {
    self.routes.insert(pattern, ())?;
    self.data.insert(pattern, handler)?;
    Ok(self)
  }

  pub fn assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.assets_dir = Some(dir.into());
    self
  }

  pub fn render_timeout(mut self, timeout: Duration) -> Self {
    self.render_timeout = timeout;
    self
  }

  /// `Some(0)` lifts the limit; `None` uses the available parallelism.
  pub fn render_limit(mut self, limit: Option<usize>) -> Self {
    self.render_limit = limit;
    self
  }

  /// Base route patterns, without the locale-prefixed variants.
  pub fn patterns(&self) -> Vec<String> {
    self.routes.patterns().map(String::from).collect()
  }

  pub fn into_parts(self) -> Result<VesselParts, ConfigError> {
    let renderer = self.renderer.unwrap_or_else(|| Arc::new(TemplateRenderer::new("")));
    let routes = Arc::new(self.routes.with_locale_prefix()?);
    let registry = PageDataRegistry::new(self.data, self.locales.clone())?;
    let entry = ServerEntry::new(self.locales, Arc::new(self.catalogs), routes, renderer);
    let render_limit = match self.render_limit {
      Some(0) => None,
      Some(n) => Some(n),
      None => Some(std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)),
    };
    Ok(VesselParts {
      entry,
      registry,
      template: self.template,
      assets_dir: self.assets_dir,
      render_timeout: self.render_timeout,
      render_limit,
    })
  }
}
