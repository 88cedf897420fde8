/* src/core/rust/src/api.rs */

use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiError;
use crate::session::{GoogleLogin, SessionRecord};
use crate::ssr::SsrState;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const SSR_DATA_PATH: &str = "/__ssr_data";
pub const SESSION_PATH: &str = "/api/auth/session";
pub const GOOGLE_LOGIN_PATH: &str = "/api/auth/login/google";
pub const EMAIL_REQUEST_PATH: &str = "/api/auth/login/email/request";
pub const EMAIL_VERIFY_PATH: &str = "/api/auth/login/email/verify";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// `{ code, data, message }` envelope used by every JSON API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
  #[serde(default)]
  pub code: i64,
  pub data: Option<T>,
  #[serde(default)]
  pub message: String,
}

impl<T> ApiResponse<T> {
  pub fn ok(data: T) -> Self {
    Self { code: 0, data: Some(data), message: String::new() }
  }
}

/// Interpret an envelope. Non-2xx and non-zero `code` are failures carrying `message`;
/// a null or missing `data` is `Ok(None)`.
pub fn parse_envelope<T: DeserializeOwned>(
  status: u16,
  body: &[u8],
) -> Result<Option<T>, ApiError> {
  let payload: ApiResponse<Value> =
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidResponse)?;

  if !(200..300).contains(&status) {
    let message =
      if payload.message.is_empty() { format!("HTTP {status}") } else { payload.message };
    return Err(ApiError::Status { status, message });
  }

  if payload.code != 0 {
    let message =
      if payload.message.is_empty() { "request-failed".to_string() } else { payload.message };
    return Err(ApiError::Rejected { code: payload.code, message });
  }

  match payload.data {
    None | Some(Value::Null) => Ok(None),
    Some(data) => serde_json::from_value(data).map(Some).map_err(|_| ApiError::InvalidResponse),
  }
}

/// Session endpoints of the backing service.
pub trait AuthApi: Send + Sync {
  /// `None` when the service reports no session.
  fn session(&self) -> BoxFuture<'_, Result<Option<SessionRecord>, ApiError>>;

  fn login_google<'a>(
    &'a self,
    payload: &'a GoogleLogin,
  ) -> BoxFuture<'a, Result<SessionRecord, ApiError>>;

  fn request_email_code<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<(), ApiError>>;

  fn verify_email_code<'a>(
    &'a self,
    email: &'a str,
    code: &'a str,
  ) -> BoxFuture<'a, Result<SessionRecord, ApiError>>;

  fn logout(&self) -> BoxFuture<'_, Result<(), ApiError>>;
}

/// Where the client fetches page data for a path it navigates to.
pub trait SsrDataSource: Send + Sync {
  fn fetch<'a>(&'a self, full_path: &'a str) -> BoxFuture<'a, Result<SsrState, ApiError>>;
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn body(v: Value) -> Vec<u8> {
    serde_json::to_vec(&v).unwrap()
  }

  #[test]
  fn success_returns_data() {
    let raw = body(json!({"code": 0, "data": {"a": 1}, "message": ""}));
    let out: Option<Value> = parse_envelope(200, &raw).unwrap();
    assert_eq!(out, Some(json!({"a": 1})));
  }

  #[test]
  fn null_data_is_none() {
    let raw = body(json!({"code": 0, "data": null, "message": "ok"}));
    let out: Option<Value> = parse_envelope(200, &raw).unwrap();
    assert!(out.is_none());
  }

  #[test]
  fn non_zero_code_is_rejected() {
    let raw = body(json!({"code": 1001, "data": null, "message": "invalid-code"}));
    let err = parse_envelope::<Value>(200, &raw).unwrap_err();
    assert_eq!(err, ApiError::Rejected { code: 1001, message: "invalid-code".into() });
    let err = parse_envelope::<Value>(200, &body(json!({"code": 7}))).unwrap_err();
    assert_eq!(err.message(), "request-failed");
  }

  #[test]
  fn http_failure_carries_message() {
    let raw = body(json!({"code": 401, "message": "unauthorized"}));
    let err = parse_envelope::<Value>(401, &raw).unwrap_err();
    assert_eq!(err, ApiError::Status { status: 401, message: "unauthorized".into() });
    let err = parse_envelope::<Value>(500, &body(json!({}))).unwrap_err();
    assert_eq!(err.message(), "HTTP 500");
  }

  #[test]
  fn garbage_is_invalid_response() {
    assert_eq!(parse_envelope::<Value>(200, b"<html>").unwrap_err(), ApiError::InvalidResponse);
    let err = parse_envelope::<u32>(200, &body(json!({"code": 0, "data": "nope"}))).unwrap_err();
    assert_eq!(err, ApiError::InvalidResponse);
  }
}
