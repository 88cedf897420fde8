/* src/server/adapter/axum/src/handler/page.rs */

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use serde_json::Value;
use uuid::Uuid;
use vessel_core::api::SSR_DATA_PATH;
use vessel_core::ssr::{LOCALE_KEY, SESSION_KEY, SITE_ORIGIN_KEY};
use vessel_core::{SsrState, VesselError};
use vessel_injector::{assemble_page, fallback_page};

use super::AppState;
use crate::cookie::{request_origin, session_from_headers};
use crate::entry::RenderOutcome;
use crate::error::AxumError;

/// Initial SSR state for a page request: page data, locale, session and origin.
async fn seed_state(
  state: &AppState,
  uri: &Uri,
  headers: &HeaderMap,
) -> Result<SsrState, VesselError> {
  let full_path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or(uri.path());
  let mut seed = match state.registry.resolve(full_path).await {
    Ok(data) => data,
    // Pages without a data handler still render.
    Err(e) if e.status() == 404 => SsrState::new(),
    Err(e) => return Err(e),
  };

  let locale = state.entry.locales().locale_from_path(uri.path());
  seed.insert(LOCALE_KEY.to_string(), Value::String(locale.to_string()));
  if let Some(record) = session_from_headers(headers) {
    let value = serde_json::to_value(record).map_err(|e| VesselError::internal(e.to_string()))?;
    seed.insert(SESSION_KEY.to_string(), value);
  }
  if let Some(origin) = request_origin(headers) {
    seed.insert(SITE_ORIGIN_KEY.to_string(), Value::String(origin));
  }
  Ok(seed)
}

/// Render on a separate task under the concurrency limit and the render timeout.
async fn render_bounded(
  state: Arc<AppState>,
  url: String,
  seed: SsrState,
) -> Result<RenderOutcome, VesselError> {
  let timeout = state.render_timeout;
  let mut task = tokio::spawn(async move {
    let _permit = match state.render_limit {
      Some(ref limit) => {
        Some(limit.acquire().await.map_err(|_| VesselError::unavailable("render pool closed"))?)
      }
      None => None,
    };
    state.entry.render(&url, seed).await
  });

  match tokio::time::timeout(timeout, &mut task).await {
    Ok(Ok(result)) => result,
    Ok(Err(join)) => Err(VesselError::internal(format!("render task failed: {join}"))),
    Err(_) => {
      task.abort();
      Err(VesselError::render_timeout(format!("render exceeded {}ms", timeout.as_millis())))
    }
  }
}

/// Fallback handler: server-render every GET that no other route claimed.
pub(super) async fn handle_page(
  State(state): State<Arc<AppState>>,
  method: Method,
  uri: Uri,
  headers: HeaderMap,
) -> Response {
  if method != Method::GET && method != Method::HEAD {
    return StatusCode::NOT_FOUND.into_response();
  }
  if uri.path().starts_with(SSR_DATA_PATH) {
    return AxumError(VesselError::not_found("unknown data endpoint")).into_response();
  }

  let seed = match seed_state(&state, &uri, &headers).await {
    Ok(seed) => seed,
    Err(e) => return AxumError(e).into_response(),
  };
  let url = uri.path_and_query().map(|pq| pq.as_str().to_string()).unwrap_or(uri.path().into());
  let fallback_locale = state.entry.locales().locale_from_path(uri.path());

  match render_bounded(state.clone(), url, seed.clone()).await {
    Ok(RenderOutcome::Redirect(target)) => {
      (StatusCode::FOUND, [(LOCATION, target)]).into_response()
    }
    Ok(RenderOutcome::Page { html, head, state: payload, locale }) => {
      Html(assemble_page(&state.template, &html, &head, locale.as_str(), &payload)).into_response()
    }
    Err(e) => {
      let request_id = Uuid::new_v4().to_string();
      tracing::error!(
        request_id = %request_id,
        path = %uri.path(),
        error = %e,
        "server render failed"
      );
      let payload = Value::Object(seed);
      Html(fallback_page(&state.template, &payload, fallback_locale.as_str(), &request_id))
        .into_response()
    }
  }
}
