/* src/client/rust/src/transport.rs */

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use vessel_core::api::{
  EMAIL_REQUEST_PATH, EMAIL_VERIFY_PATH, GOOGLE_LOGIN_PATH, LOGOUT_PATH, SESSION_PATH,
  SSR_DATA_PATH,
};
use vessel_core::session::SessionPayload;
use vessel_core::config::ClientSection;
use vessel_core::ssr::into_state;
use vessel_core::{
  ApiError, AuthApi, BoxFuture, GoogleLogin, SessionRecord, SsrDataSource, SsrState,
  parse_envelope,
};

use crate::error::ClientError;

/// Upper bound for one request, so a hung endpoint surfaces as a network error.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn network(e: impl std::fmt::Display) -> ApiError {
  ApiError::Network(e.to_string())
}

/// JSON-over-HTTP access to the page data endpoint and the session API.
///
/// Keeps a cookie jar so the session cookie set by a login is sent on later calls.
#[derive(Clone)]
pub struct HttpTransport {
  client: Client,
  base: Url,
}

impl HttpTransport {
  pub fn new(base_url: &str) -> Result<Self, ClientError> {
    Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
  }

  pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
    let client = Client::builder().cookie_store(true).timeout(timeout).build()?;
    Self::with_client(client, base_url)
  }

  pub fn from_section(section: &ClientSection) -> Result<Self, ClientError> {
    Self::with_timeout(&section.base_url, Duration::from_millis(section.request_timeout_ms))
  }

  pub fn with_client(client: Client, base_url: &str) -> Result<Self, ClientError> {
    let base = Url::parse(base_url)
      .map_err(|e| ClientError::BaseUrl { url: base_url.to_string(), reason: e.to_string() })?;
    Ok(Self { client, base })
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  fn url(&self, path: &str) -> Result<Url, ApiError> {
    self.base.join(path).map_err(network)
  }

  async fn envelope<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
  ) -> Result<Option<T>, ApiError> {
    let resp = req.header(ACCEPT, "application/json").send().await.map_err(network)?;
    let status = resp.status().as_u16();
    let body = resp.bytes().await.map_err(network)?;
    parse_envelope(status, &body)
  }

  async fn session_call(&self, req: RequestBuilder) -> Result<SessionRecord, ApiError> {
    self
      .envelope::<SessionPayload>(req)
      .await?
      .and_then(SessionPayload::into_record)
      .ok_or(ApiError::InvalidResponse)
  }

  /// `GET /__ssr_data?path=...`. Any JSON object is accepted; non-objects read as `{}`.
  pub async fn fetch_ssr_data(&self, full_path: &str) -> Result<SsrState, ApiError> {
    let mut url = self.url(SSR_DATA_PATH)?;
    url.query_pairs_mut().append_pair("path", full_path);
    let resp =
      self.client.get(url).header(ACCEPT, "application/json").send().await.map_err(network)?;
    let status = resp.status();
    if !status.is_success() {
      return Err(ApiError::Status {
        status: status.as_u16(),
        message: format!("Request failed with status {}", status.as_u16()),
      });
    }
    let value: Value = resp.json().await.map_err(|_| ApiError::InvalidResponse)?;
    Ok(into_state(value))
  }
}

impl SsrDataSource for HttpTransport {
  fn fetch<'a>(&'a self, full_path: &'a str) -> BoxFuture<'a, Result<SsrState, ApiError>> {
    Box::pin(self.fetch_ssr_data(full_path))
  }
}

impl AuthApi for HttpTransport {
  fn session(&self) -> BoxFuture<'_, Result<Option<SessionRecord>, ApiError>> {
    Box::pin(async move {
      let req = self.client.get(self.url(SESSION_PATH)?);
      let payload = self.envelope::<SessionPayload>(req).await?;
      Ok(payload.and_then(SessionPayload::into_record))
    })
  }

  fn login_google<'a>(
    &'a self,
    payload: &'a GoogleLogin,
  ) -> BoxFuture<'a, Result<SessionRecord, ApiError>> {
    Box::pin(async move {
      let req = self.client.post(self.url(GOOGLE_LOGIN_PATH)?).json(payload);
      self.session_call(req).await
    })
  }

  fn request_email_code<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<(), ApiError>> {
    Box::pin(async move {
      let req = self.client.post(self.url(EMAIL_REQUEST_PATH)?).json(&json!({ "email": email }));
      self.envelope::<Value>(req).await.map(|_| ())
    })
  }

  fn verify_email_code<'a>(
    &'a self,
    email: &'a str,
    code: &'a str,
  ) -> BoxFuture<'a, Result<SessionRecord, ApiError>> {
    Box::pin(async move {
      let body = json!({ "email": email, "code": code });
      let req = self.client.post(self.url(EMAIL_VERIFY_PATH)?).json(&body);
      self.session_call(req).await
    })
  }

  fn logout(&self) -> BoxFuture<'_, Result<(), ApiError>> {
    Box::pin(async move {
      let req = self.client.post(self.url(LOGOUT_PATH)?);
      self.envelope::<Value>(req).await.map(|_| ())
    })
  }
}
