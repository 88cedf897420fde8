/* src/client/rust/src/error.rs */

use vessel_core::{ApiError, ConfigError, NavigationError, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  #[error("http client: {0}")]
  Http(#[from] reqwest::Error),
  #[error("invalid base url {url}: {reason}")]
  BaseUrl { url: String, reason: String },
  #[error(transparent)]
  Api(#[from] ApiError),
  #[error(transparent)]
  Session(#[from] SessionError),
  #[error(transparent)]
  Navigation(#[from] NavigationError),
  #[error("preferences at {path}: {source}")]
  Preferences { path: String, source: std::io::Error },
  #[error(transparent)]
  Config(#[from] ConfigError),
  #[error("mount failed: {0}")]
  Mount(String),
}
