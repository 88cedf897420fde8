/* src/server/adapter/axum/src/handler/data.rs */

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::Value;
use vessel_core::ssr::LOCALE_KEY;

use super::AppState;
use crate::error::AxumError;

#[derive(Deserialize)]
pub(super) struct SsrDataQuery {
  #[serde(default)]
  path: Option<String>,
}

/// `GET /__ssr_data?path=/hi/bob?title=x`: page data for a client-side navigation.
pub(super) async fn handle_ssr_data(
  State(state): State<Arc<AppState>>,
  Query(query): Query<SsrDataQuery>,
) -> Result<Json<Value>, AxumError> {
  let path = query.path.filter(|p| !p.is_empty()).unwrap_or_else(|| "/".to_string());
  let mut data = state.registry.resolve(&path).await?;
  if !data.contains_key(LOCALE_KEY) {
    let location = vessel_core::Location::parse(&path);
    let locale = state.registry.locales().locale_from_path(&location.path);
    data.insert(LOCALE_KEY.to_string(), Value::String(locale.to_string()));
  }
  Ok(Json(Value::Object(data)))
}
