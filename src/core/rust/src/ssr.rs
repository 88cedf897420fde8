/* src/core/rust/src/ssr.rs */

use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Server-computed state for one render: string keys to arbitrary JSON.
pub type SsrState = serde_json::Map<String, Value>;

/// Reserved key holding the serialized store snapshot.
pub const STORE_KEY: &str = "store";
pub const LOCALE_KEY: &str = "locale";
pub const SESSION_KEY: &str = "session";
pub const SITE_ORIGIN_KEY: &str = "siteOrigin";

/// Per-render-tree slot for the current SSR state.
///
/// `set_state` replaces the whole value. Callers that want a partial update spread
/// the previous state themselves (see [`spread`]).
#[derive(Debug, Clone, Default)]
pub struct SsrContext {
  state: Arc<RwLock<SsrState>>,
}

impl SsrContext {
  pub fn new(initial: SsrState) -> Self {
    Self { state: Arc::new(RwLock::new(initial)) }
  }

  /// Any non-object value starts the context empty.
  pub fn from_value(initial: Value) -> Self {
    Self::new(into_state(initial))
  }

  pub fn state(&self) -> SsrState {
    self.state.read().clone()
  }

  pub fn to_value(&self) -> Value {
    Value::Object(self.state())
  }

  pub fn get(&self, key: &str) -> Option<Value> {
    self.state.read().get(key).cloned()
  }

  pub fn is_empty(&self) -> bool {
    self.state.read().is_empty()
  }

  pub fn set_state(&self, next: Value) {
    *self.state.write() = into_state(next);
  }

  /// Read-modify-write under a single write lock. `f` must not touch this context.
  pub fn update<R>(&self, f: impl FnOnce(&mut SsrState) -> R) -> R {
    f(&mut self.state.write())
  }

  /// Typed view of the whole state. Missing or mismatched shapes read as `None`.
  pub fn data<T: DeserializeOwned>(&self) -> Option<T> {
    serde_json::from_value(self.to_value()).ok()
  }
}

/// Normalize an arbitrary JSON value into SSR state.
pub fn into_state(value: Value) -> SsrState {
  match value {
    Value::Object(map) => map,
    _ => SsrState::new(),
  }
}

/// `{ ...base, ...patch }`: patch keys override, untouched keys survive.
pub fn spread(mut base: SsrState, patch: SsrState) -> SsrState {
  base.extend(patch);
  base
}
