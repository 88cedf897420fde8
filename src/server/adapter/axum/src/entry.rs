/* src/server/adapter/axum/src/entry.rs */

use std::sync::Arc;

use serde_json::Value;
use vessel_core::{
  Catalogs, Locale, LocaleSet, Location, NavigationError, NavigationOutcome, RenderTree,
  RenderTreeOptions, RouteTable, Side, SsrState, VesselError,
};

use crate::render::Renderer;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
  Page { html: String, head: String, state: Value, locale: Locale },
  /// Navigation ended somewhere else; answer with a redirect to this full path.
  Redirect(String),
}

/// Builds a fresh server render tree per request and renders the requested URL.
#[derive(Clone)]
pub struct ServerEntry {
  locales: LocaleSet,
  catalogs: Arc<Catalogs>,
  routes: Arc<RouteTable>,
  renderer: Arc<dyn Renderer>,
}

impl ServerEntry {
  pub fn new(
    locales: LocaleSet,
    catalogs: Arc<Catalogs>,
    routes: Arc<RouteTable>,
    renderer: Arc<dyn Renderer>,
  ) -> Self {
    Self { locales, catalogs, routes, renderer }
  }

  pub fn locales(&self) -> &LocaleSet {
    &self.locales
  }

  pub fn routes(&self) -> &RouteTable {
    &self.routes
  }

  /// Render `url` with `seed` as the initial SSR state.
  pub async fn render(&self, url: &str, seed: SsrState) -> Result<RenderOutcome, VesselError> {
    let tree = RenderTree::build(RenderTreeOptions {
      catalogs: self.catalogs.clone(),
      initial: Value::Object(seed),
      ..RenderTreeOptions::new(Side::Server, self.locales.clone(), self.routes.clone())
    });

    let requested = Location::parse(url);
    let location = match tree.router().push(url).await {
      Ok(NavigationOutcome::Committed { location, .. }) => location,
      Ok(NavigationOutcome::Superseded) => {
        return Err(VesselError::internal(format!("navigation to {url} was superseded")));
      }
      Err(NavigationError::RedirectLoop { path, hops }) => {
        return Err(VesselError::internal(format!("redirect loop at {path} after {hops} hops")));
      }
    };
    if location.path != requested.path {
      return Ok(RenderOutcome::Redirect(location.full_path()));
    }

    let output = self.renderer.render(&tree).await?;
    Ok(RenderOutcome::Page {
      html: output.html,
      head: output.head,
      state: tree.ssr().to_value(),
      locale: tree.i18n().active_locale(),
    })
  }
}
