/* src/server/adapter/axum/src/error.rs */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vessel_core::VesselError;

/// `VesselError` as an axum response (orphan rule: both types are foreign here).
///
/// Body: `{ ok: false, error: { code, message } }`. Server-side failures are logged.
#[derive(Debug)]
pub(crate) struct AxumError(pub VesselError);

impl IntoResponse for AxumError {
  fn into_response(self) -> Response {
    let err = self.0;
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
      tracing::error!(code = err.code(), message = err.message(), "request failed");
    }
    let body = serde_json::json!({
      "ok": false,
      "error": { "code": err.code(), "message": err.message() },
    });
    (status, axum::Json(body)).into_response()
  }
}

impl From<VesselError> for AxumError {
  fn from(err: VesselError) -> Self {
    Self(err)
  }
}
