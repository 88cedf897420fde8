/* src/core/rust/src/errors.rs */

use std::fmt;

/// Failure surfaced by server-side page data handlers and the render pipeline.
#[derive(Debug, Clone)]
pub struct VesselError {
  code: String,
  message: String,
  status: u16,
}

fn default_status(code: &str) -> u16 {
  match code {
    "VALIDATION_ERROR" => 400,
    "UNAUTHORIZED" => 401,
    "NOT_FOUND" => 404,
    "RENDER_TIMEOUT" => 504,
    "UNAVAILABLE" => 503,
    _ => 500,
  }
}

impl VesselError {
  pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
    Self { code: code.into(), message: message.into(), status }
  }

  pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
    let code = code.into();
    let status = default_status(&code);
    Self { code, message: message.into(), status }
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::with_code("VALIDATION_ERROR", msg)
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::with_code("NOT_FOUND", msg)
  }

  pub fn internal(msg: impl Into<String>) -> Self {
    Self::with_code("INTERNAL_ERROR", msg)
  }

  pub fn unauthorized(msg: impl Into<String>) -> Self {
    Self::with_code("UNAUTHORIZED", msg)
  }

  pub fn unavailable(msg: impl Into<String>) -> Self {
    Self::with_code("UNAVAILABLE", msg)
  }

  pub fn render_timeout(msg: impl Into<String>) -> Self {
    Self::with_code("RENDER_TIMEOUT", msg)
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn status(&self) -> u16 {
    self.status
  }
}

impl fmt::Display for VesselError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code, self.message)
  }
}

impl std::error::Error for VesselError {}

/// Transport and envelope failures of the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
  #[error("network-error: {0}")]
  Network(String),
  #[error("invalid-response")]
  InvalidResponse,
  /// Non-2xx HTTP status. `message` comes from the envelope when one was sent.
  #[error("{message}")]
  Status { status: u16, message: String },
  /// 2xx with a non-zero envelope `code`.
  #[error("{message}")]
  Rejected { code: i64, message: String },
}

impl ApiError {
  pub fn message(&self) -> String {
    self.to_string()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
  /// `verify_email_code` was called before a code request succeeded.
  #[error("missing-email")]
  MissingEmail,
  #[error(transparent)]
  Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
  #[error("redirect loop while navigating to {path} ({hops} hops)")]
  RedirectLoop { path: String, hops: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Io { path: String, source: std::io::Error },
  #[error("failed to parse {path}: {source}")]
  Parse { path: String, source: toml::de::Error },
  #[error("failed to parse catalog {path}: {source}")]
  Catalog { path: String, source: serde_json::Error },
  #[error("{0}")]
  Invalid(String),
}
