/* src/client/rust/src/entry.rs */

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use vessel_core::navigation::load_page_data;
use vessel_core::ssr::SESSION_KEY;
use vessel_core::{
  AuthApi, Catalogs, Locale, LocaleSet, NavigationOutcome, RenderTree, RenderTreeOptions,
  RouteTable, SessionRecord, SessionStore, Side, SsrDataSource, VesselConfig,
};
use vessel_injector::extract_ssr_data;

use crate::error::ClientError;
use crate::preference::{FilePreferences, MemoryPreferences, PreferenceStore};
use crate::transport::HttpTransport;

/// The view layer the booted tree is handed to.
pub trait Mount {
  fn mount(&mut self, tree: &RenderTree) -> Result<(), ClientError>;
}

/// Boots the client render tree for a page load.
pub struct ClientEntry {
  locales: LocaleSet,
  catalogs: Arc<Catalogs>,
  routes: Arc<RouteTable>,
  source: Arc<dyn SsrDataSource>,
  auth: Option<Arc<dyn AuthApi>>,
  preferences: Arc<dyn PreferenceStore>,
}

impl ClientEntry {
  pub fn new(
    locales: LocaleSet,
    routes: impl Into<Arc<RouteTable>>,
    source: Arc<dyn SsrDataSource>,
  ) -> Self {
    Self {
      locales,
      catalogs: Arc::default(),
      routes: routes.into(),
      source,
      auth: None,
      preferences: Arc::new(MemoryPreferences::default()),
    }
  }

  /// Page data and session calls both go through `transport`.
  pub fn with_transport(
    locales: LocaleSet,
    routes: impl Into<Arc<RouteTable>>,
    transport: Arc<HttpTransport>,
  ) -> Self {
    Self::new(locales, routes, transport.clone()).auth(transport)
  }

  /// Locales, catalogs, transport and preference file from a loaded config. Relative paths
  /// resolve against `base`; without `preference_file` preferences stay in memory.
  pub fn from_config(
    config: &VesselConfig,
    base: &Path,
    routes: impl Into<Arc<RouteTable>>,
  ) -> Result<Self, ClientError> {
    let transport = Arc::new(HttpTransport::from_section(&config.client)?);
    let mut entry = Self::with_transport(config.i18n.locale_set()?, routes, transport)
      .catalogs(config.i18n.catalogs(base)?);
    if let Some(ref file) = config.client.preference_file {
      entry = entry.preferences(Arc::new(FilePreferences::new(base.join(file))));
    }
    Ok(entry)
  }

  pub fn locales(&self) -> &LocaleSet {
    &self.locales
  }

  pub fn catalogs(mut self, catalogs: Catalogs) -> Self {
    self.catalogs = Arc::new(catalogs);
    self
  }

  pub fn auth(mut self, api: Arc<dyn AuthApi>) -> Self {
    self.auth = Some(api);
    self
  }

  pub fn preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
    self.preferences = preferences;
    self
  }

  /// Boot from a server-rendered page, reading the payload embedded in `html`.
  pub async fn boot_html(
    &self,
    url: &str,
    html: &str,
    mount: &mut dyn Mount,
  ) -> Result<ClientApp, ClientError> {
    let mut payload = extract_ssr_data(html);
    self.boot(url, &mut payload, mount).await
  }

  /// Hydrate and mount. `payload` is the inlined SSR state; it is taken once the mount
  /// succeeded. A session in the payload is applied before mount; without one the live
  /// session check runs in the background and never delays the mount.
  pub async fn boot(
    &self,
    url: &str,
    payload: &mut Option<Value>,
    mount: &mut dyn Mount,
  ) -> Result<ClientApp, ClientError> {
    let inline = payload.clone().filter(|p| p.as_object().is_some_and(|m| !m.is_empty()));
    let had_inline = inline.is_some();

    let tree = RenderTree::build(RenderTreeOptions {
      catalogs: self.catalogs.clone(),
      initial: inline.unwrap_or_else(|| Value::Object(Default::default())),
      auth: self.auth.clone(),
      data_source: Some(self.source.clone()),
      ..RenderTreeOptions::new(Side::Client, self.locales.clone(), self.routes.clone())
    });

    // Saved preference first; the first navigation then syncs to the URL's locale.
    let saved = self.preferences.locale().and_then(|l| self.locales.canonicalize(&l));
    if let Some(ref locale) = saved {
      tree.locale().set_locale(locale.as_str());
      tree.i18n().set_active_locale(locale);
    }

    let app = ClientApp {
      tree,
      preferences: self.preferences.clone(),
      persisted: Mutex::new(saved),
      session_check: Mutex::new(None),
    };
    app.tree.router().push(url).await?;

    if !had_inline {
      let current =
        app.tree.router().current().map(|l| l.full_path()).unwrap_or_else(|| url.into());
      load_page_data(self.source.as_ref(), app.tree.ssr(), &current).await;
    }

    if let Some(session) = app.tree.session() {
      let record = app.tree.ssr().get(SESSION_KEY).as_ref().and_then(SessionRecord::from_value);
      *app.session_check.lock() = session.start_hydration(record);
    }

    app.persist_locale();
    mount.mount(&app.tree)?;
    if payload.take().is_some() {
      tracing::debug!("inline SSR payload discarded after mount");
    }
    Ok(app)
  }
}

/// A mounted client page.
pub struct ClientApp {
  tree: RenderTree,
  preferences: Arc<dyn PreferenceStore>,
  persisted: Mutex<Option<Locale>>,
  session_check: Mutex<Option<JoinHandle<()>>>,
}

impl ClientApp {
  pub fn tree(&self) -> &RenderTree {
    &self.tree
  }

  /// Document language: the active locale.
  pub fn lang(&self) -> Locale {
    self.tree.i18n().active_locale()
  }

  pub fn session(&self) -> Option<&SessionStore> {
    self.tree.session()
  }

  /// Wait for the background session check started at boot, if any.
  pub async fn session_settled(&self) {
    let check = self.session_check.lock().take();
    if let Some(check) = check {
      if let Err(e) = check.await {
        tracing::debug!(error = %e, "session check task ended abnormally");
      }
    }
  }

  pub async fn navigate(&self, target: &str) -> Result<NavigationOutcome, ClientError> {
    let outcome = self.tree.router().push(target).await?;
    self.persist_locale();
    Ok(outcome)
  }

  pub async fn navigate_localized(
    &self,
    target: &str,
    locale: Option<&str>,
  ) -> Result<NavigationOutcome, ClientError> {
    let outcome = self.tree.router().push_localized(target, locale).await?;
    self.persist_locale();
    Ok(outcome)
  }

  /// Stay on the current page, under `locale`.
  pub async fn switch_locale(&self, locale: &str) -> Result<NavigationOutcome, ClientError> {
    let current = self.tree.router().current().map(|l| l.full_path()).unwrap_or_else(|| "/".into());
    self.navigate_localized(&current, Some(locale)).await
  }

  // Write the active locale when it changed; a failed write only logs.
  fn persist_locale(&self) {
    let lang = self.lang();
    let mut persisted = self.persisted.lock();
    if persisted.as_ref() == Some(&lang) {
      return;
    }
    match self.preferences.set_locale(lang.as_str()) {
      Ok(()) => *persisted = Some(lang),
      Err(e) => tracing::warn!(locale = %lang, error = %e, "failed to persist locale preference"),
    }
  }
}

#[cfg(test)]
mod tests;
