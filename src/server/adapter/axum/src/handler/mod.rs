/* src/server/adapter/axum/src/handler/mod.rs */

mod data;
mod page;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tokio::sync::Semaphore;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vessel_core::api::SSR_DATA_PATH;

use crate::data::PageDataRegistry;
use crate::entry::ServerEntry;
use crate::server::VesselParts;

pub(crate) const ASSETS_PATH: &str = "/assets";

pub(crate) struct AppState {
  pub entry: ServerEntry,
  pub registry: PageDataRegistry,
  pub template: String,
  pub render_timeout: Duration,
  pub render_limit: Option<Semaphore>,
}

pub(crate) fn build_router(parts: VesselParts) -> Router {
  let VesselParts { entry, registry, template, assets_dir, render_timeout, render_limit } = parts;
  let state = Arc::new(AppState {
    entry,
    registry,
    template,
    render_timeout,
    render_limit: render_limit.map(Semaphore::new),
  });

  let mut router = Router::new().route(SSR_DATA_PATH, get(data::handle_ssr_data));
  if let Some(dir) = assets_dir {
    router = router.nest_service(ASSETS_PATH, ServeDir::new(dir));
  }
  router.fallback(page::handle_page).with_state(state).layer(TraceLayer::new_for_http())
}
