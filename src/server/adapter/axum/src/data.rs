/* src/server/adapter/axum/src/data.rs */

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::Uri;
use serde_json::Value;
use vessel_core::ssr::into_state;
use vessel_core::{
  BoxFuture, ConfigError, Locale, LocaleSet, Location, ParamValue, RouteTable, SsrState,
  VesselError,
};

/// What a page data handler sees of the request.
#[derive(Debug, Clone)]
pub struct PageRequest {
  pub path: String,
  pub params: BTreeMap<String, ParamValue>,
  pub query: HashMap<String, String>,
  pub locale: Locale,
}

impl PageRequest {
  pub fn param(&self, name: &str) -> Option<&str> {
    self.params.get(name).and_then(ParamValue::candidate)
  }

  pub fn query(&self, name: &str) -> Option<&str> {
    self.query.get(name).map(String::as_str)
  }
}

pub type DataHandler =
  Arc<dyn Fn(PageRequest) -> BoxFuture<'static, Result<Value, VesselError>> + Send + Sync>;

/// Box an async fn as a [`DataHandler`].
pub fn data_handler<F, Fut>(f: F) -> DataHandler
where
  F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Value, VesselError>> + Send + 'static,
{
  Arc::new(move |req| Box::pin(f(req)))
}

/// Page data handlers keyed by route, each reachable with and without a locale prefix.
#[derive(Clone)]
pub struct PageDataRegistry {
  routes: Arc<RouteTable<DataHandler>>,
  locales: LocaleSet,
}

impl PageDataRegistry {
  pub fn new(base: RouteTable<DataHandler>, locales: LocaleSet) -> Result<Self, ConfigError> {
    Ok(Self { routes: Arc::new(base.with_locale_prefix()?), locales })
  }

  pub fn locales(&self) -> &LocaleSet {
    &self.locales
  }

  /// Run the handler registered for `full_path` (`path?query`).
  ///
  /// `NOT_FOUND` when no route matches. A handler returning a non-object yields `{}`.
  pub async fn resolve(&self, full_path: &str) -> Result<SsrState, VesselError> {
    let location = Location::parse(full_path);
    let (matched, handler) = self
      .routes
      .match_path(&location.path)
      .ok_or_else(|| VesselError::not_found(format!("no page data for {}", location.path)))?;

    let locale = matched
      .locale_candidate()
      .and_then(|c| self.locales.canonicalize(c))
      .unwrap_or_else(|| self.locales.default_locale().clone());

    let request = PageRequest {
      path: location.path.clone(),
      params: matched.params.clone(),
      query: parse_query(location.query.as_deref()),
      locale,
    };
    let value = handler(request).await?;
    Ok(into_state(value))
  }
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
  let Some(query) = query else {
    return HashMap::new();
  };
  let Ok(uri) = format!("/?{query}").parse::<Uri>() else {
    return HashMap::new();
  };
  Query::<HashMap<String, String>>::try_from_uri(&uri).map(|Query(q)| q).unwrap_or_default()
}
