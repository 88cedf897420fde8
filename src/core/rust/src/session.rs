/* src/core/rust/src/session.rs */

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::api::AuthApi;
use crate::errors::{ApiError, SessionError};
use crate::store::{StateTree, StoreState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
  Google,
  #[default]
  Email,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub provider: AuthProvider,
}

/// A complete session: always a non-empty token plus its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
  pub session_token: String,
  pub user: AuthUser,
}

impl SessionRecord {
  /// Lenient read of a session payload. Missing user or empty token means no session.
  pub fn from_value(value: &Value) -> Option<Self> {
    let payload: SessionPayload = serde_json::from_value(value.clone()).ok()?;
    payload.into_record()
  }

  pub fn is_valid(&self) -> bool {
    !self.session_token.is_empty()
  }
}

/// Wire shape of `/api/auth/session` and the login responses; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionPayload {
  #[serde(default)]
  pub session_token: String,
  #[serde(default)]
  pub user: Option<AuthUser>,
}

impl SessionPayload {
  pub fn into_record(self) -> Option<SessionRecord> {
    if self.session_token.is_empty() {
      return None;
    }
    let user = self.user?;
    Some(SessionRecord { session_token: self.session_token, user })
  }
}

/// Body of the Google login call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleLogin {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub access_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthStatus {
  #[default]
  Idle,
  SendingCode,
  Verifying,
  Authenticated,
}

/// One-shot notices for the UI, read with [`SessionStore::consume_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMessage {
  CodeSent,
  SignedIn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
  #[serde(default)]
  pub user: Option<AuthUser>,
  #[serde(default)]
  pub status: AuthStatus,
  #[serde(default)]
  pub message: Option<SessionMessage>,
  #[serde(default)]
  pub email_for_verification: Option<String>,
  #[serde(default)]
  pub session_token: String,
}

impl StoreState for AuthState {
  const ID: &'static str = "auth";
}

impl AuthState {
  fn apply(&mut self, record: SessionRecord) {
    self.user = Some(record.user);
    self.session_token = record.session_token;
    self.status = AuthStatus::Authenticated;
    self.message = Some(SessionMessage::SignedIn);
    self.email_for_verification = None;
  }

  fn clear(&mut self) {
    *self = Self::default();
  }
}

/// Authentication state of one render tree.
#[derive(Clone)]
pub struct SessionStore {
  tree: StateTree,
  api: Arc<dyn AuthApi>,
}

impl SessionStore {
  pub fn new(tree: StateTree, api: Arc<dyn AuthApi>) -> Self {
    Self { tree, api }
  }

  pub fn state(&self) -> AuthState {
    self.tree.read::<AuthState>()
  }

  pub fn user(&self) -> Option<AuthUser> {
    self.state().user
  }

  pub fn status(&self) -> AuthStatus {
    self.state().status
  }

  pub fn is_authenticated(&self) -> bool {
    self.state().user.is_some()
  }

  /// Take the pending message, but only if it is `expected` (when given).
  pub fn consume_message(&self, expected: Option<SessionMessage>) -> Option<SessionMessage> {
    self.tree.update::<AuthState, _>(|s| {
      let current = s.message?;
      if expected.is_some_and(|e| e != current) {
        return None;
      }
      s.message = None;
      Some(current)
    })
  }

  /// Apply an inbound session, or ask the service for one. Failures leave the store
  /// logged out; nothing is returned to the caller.
  pub async fn hydrate_session(&self, initial: Option<SessionRecord>) {
    if let Some(record) = initial.filter(SessionRecord::is_valid) {
      self.apply(record);
      return;
    }
    match self.api.session().await {
      Ok(Some(record)) if record.is_valid() => self.apply(record),
      Ok(_) => self.clear(),
      Err(e) => {
        tracing::debug!(error = %e, "session check failed; continuing logged out");
        self.clear();
      }
    }
  }

  /// Like [`hydrate_session`](Self::hydrate_session), but never waits: an inbound record
  /// is applied now, otherwise the live check runs on the current runtime.
  pub fn start_hydration(&self, initial: Option<SessionRecord>) -> Option<JoinHandle<()>> {
    if let Some(record) = initial.filter(SessionRecord::is_valid) {
      self.apply(record);
      return None;
    }
    match tokio::runtime::Handle::try_current() {
      Ok(handle) => {
        let store = self.clone();
        Some(handle.spawn(async move { store.hydrate_session(None).await }))
      }
      Err(_) => {
        tracing::debug!("no runtime; session check skipped");
        None
      }
    }
  }

  pub async fn login_with_google(&self, payload: &GoogleLogin) -> Result<(), SessionError> {
    self.tree.update::<AuthState, _>(|s| s.message = None);
    let result = self.api.login_google(payload).await;
    self.settle(result)
  }

  pub async fn request_email_code(&self, email: &str) -> Result<(), SessionError> {
    self.tree.update::<AuthState, _>(|s| {
      s.message = None;
      s.status = AuthStatus::SendingCode;
    });
    match self.api.request_email_code(email).await {
      Ok(()) => {
        self.tree.update::<AuthState, _>(|s| {
          s.email_for_verification = Some(email.to_string());
          s.message = Some(SessionMessage::CodeSent);
          s.status = AuthStatus::Idle;
        });
        Ok(())
      }
      Err(e) => {
        self.tree.update::<AuthState, _>(|s| s.status = AuthStatus::Idle);
        Err(e.into())
      }
    }
  }

  /// Verify the code sent to the pending email. Fails with `MissingEmail` before any
  /// network call when no code request has succeeded.
  pub async fn verify_email_code(&self, code: &str) -> Result<(), SessionError> {
    let Some(email) = self.state().email_for_verification else {
      return Err(SessionError::MissingEmail);
    };
    self.tree.update::<AuthState, _>(|s| {
      s.message = None;
      s.status = AuthStatus::Verifying;
    });
    let result = self.api.verify_email_code(&email, code).await;
    self.settle(result)
  }

  /// Clear the local session now and notify the service in the background.
  pub fn logout(&self) {
    match tokio::runtime::Handle::try_current() {
      Ok(handle) => {
        let api = self.api.clone();
        handle.spawn(async move {
          if let Err(e) = api.logout().await {
            tracing::debug!(error = %e, "logout notification failed");
          }
        });
      }
      Err(_) => tracing::debug!("no runtime; logout notification skipped"),
    }
    self.clear();
  }

  fn settle(&self, result: Result<SessionRecord, ApiError>) -> Result<(), SessionError> {
    match result {
      Ok(record) if record.is_valid() => {
        self.apply(record);
        Ok(())
      }
      Ok(_) => {
        self.tree.update::<AuthState, _>(|s| s.status = AuthStatus::Idle);
        Err(ApiError::InvalidResponse.into())
      }
      Err(e) => {
        self.tree.update::<AuthState, _>(|s| s.status = AuthStatus::Idle);
        Err(e.into())
      }
    }
  }

  fn apply(&self, record: SessionRecord) {
    self.tree.update::<AuthState, _>(|s| s.apply(record));
  }

  fn clear(&self) {
    self.tree.update::<AuthState, _>(AuthState::clear);
  }
}
