/* src/core/rust/src/tree.rs */

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{AuthApi, SsrDataSource};
use crate::bridge;
use crate::i18n::{Catalogs, I18n};
use crate::locale::LocaleSet;
use crate::locale_store::LocaleStore;
use crate::navigation::{DataFetch, LocaleCheck, LocaleSync, NavigationStage, Router, Side};
use crate::route::RouteTable;
use crate::session::SessionStore;
use crate::ssr::{LOCALE_KEY, SsrContext};
use crate::store::StateTree;

pub struct RenderTreeOptions {
  pub side: Side,
  pub locales: LocaleSet,
  pub catalogs: Arc<Catalogs>,
  /// Inbound SSR state: the page payload on the client, the request seed on the server.
  pub initial: Value,
  /// Shared between trees; compiled once.
  pub routes: Arc<RouteTable>,
  pub auth: Option<Arc<dyn AuthApi>>,
  /// Page data source for client navigations. Ignored on the server.
  pub data_source: Option<Arc<dyn SsrDataSource>>,
}

impl RenderTreeOptions {
  pub fn new(side: Side, locales: LocaleSet, routes: impl Into<Arc<RouteTable>>) -> Self {
    Self {
      side,
      locales,
      catalogs: Arc::default(),
      initial: Value::Object(Default::default()),
      routes: routes.into(),
      auth: None,
      data_source: None,
    }
  }
}

/// One isolated application instance: a server request or the running client page.
#[derive(Clone)]
pub struct RenderTree {
  side: Side,
  ssr: SsrContext,
  stores: StateTree,
  i18n: I18n,
  locale: LocaleStore,
  session: Option<SessionStore>,
  router: Router,
}

impl RenderTree {
  pub fn build(options: RenderTreeOptions) -> Self {
    let RenderTreeOptions { side, locales, catalogs, initial, routes, auth, data_source } = options;

    // 1. SSR state
    let ssr = SsrContext::from_value(initial);

    // 2. store tree, bridged across the render boundary
    let stores = StateTree::new();
    match side {
      Side::Server => bridge::attach(&stores, &ssr),
      Side::Client => {
        bridge::hydrate(&stores, &ssr.state());
      }
    }

    // 3. i18n and the locale store, seeded from the inbound `locale` key
    let seed = ssr.get(LOCALE_KEY).and_then(|v| v.as_str().map(String::from)).unwrap_or_default();
    let i18n = I18n::new(locales.clone(), catalogs, &seed);
    let locale = LocaleStore::new(stores.clone(), locales.clone());
    locale.set_locale(i18n.active_locale().as_str());

    // 4. session store
    let session = auth.map(|api| SessionStore::new(stores.clone(), api));

    // 5. router
    let mut stages: Vec<Box<dyn NavigationStage>> = vec![
      Box::new(LocaleCheck::new(locales.clone())),
      Box::new(LocaleSync::new(i18n.clone(), locale.clone(), ssr.clone())),
    ];
    if let (Side::Client, Some(source)) = (side, data_source) {
      stages.push(Box::new(DataFetch::new(source, ssr.clone())));
    }
    let router = Router::new(side, routes, locales, stages);

    Self { side, ssr, stores, i18n, locale, session, router }
  }

  pub fn side(&self) -> Side {
    self.side
  }

  pub fn ssr(&self) -> &SsrContext {
    &self.ssr
  }

  pub fn stores(&self) -> &StateTree {
    &self.stores
  }

  pub fn i18n(&self) -> &I18n {
    &self.i18n
  }

  pub fn locale(&self) -> &LocaleStore {
    &self.locale
  }

  pub fn session(&self) -> Option<&SessionStore> {
    self.session.as_ref()
  }

  pub fn router(&self) -> &Router {
    &self.router
  }

  /// Typed read of the current SSR state.
  pub fn data<T: DeserializeOwned>(&self) -> Option<T> {
    self.ssr.data()
  }
}
