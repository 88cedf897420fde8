/* src/server/adapter/axum/src/cookie.rs */

use axum::http::HeaderMap;
use axum::http::header::{COOKIE, HOST};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use vessel_core::{AuthProvider, AuthUser, SessionRecord};

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Deserialize)]
struct CookieClaims {
  #[serde(default)]
  id: String,
  #[serde(default)]
  name: String,
  #[serde(default)]
  email: String,
  #[serde(default)]
  provider: String,
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v.trim())
}

/// Decode the `session_token` cookie (base64 JSON claims) into a session.
///
/// Anything undecodable, or claims without an email, means no session.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionRecord> {
  let raw = cookie_value(headers, SESSION_COOKIE).filter(|v| !v.is_empty())?;
  let bytes = STANDARD.decode(raw).ok()?;
  let claims: CookieClaims = serde_json::from_slice(&bytes).ok()?;
  if claims.email.is_empty() {
    return None;
  }
  let provider = match claims.provider.as_str() {
    "google" => AuthProvider::Google,
    _ => AuthProvider::Email,
  };
  Some(SessionRecord {
    session_token: raw.to_string(),
    user: AuthUser { id: claims.id, name: claims.name, email: claims.email, provider },
  })
}

/// `scheme://host` as the client saw it. Honours the first `X-Forwarded-Proto` value.
pub fn request_origin(headers: &HeaderMap) -> Option<String> {
  let host = headers.get(HOST).and_then(|v| v.to_str().ok()).filter(|h| !h.is_empty())?;
  let scheme = headers
    .get("x-forwarded-proto")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .unwrap_or("http");
  Some(format!("{scheme}://{host}"))
}
