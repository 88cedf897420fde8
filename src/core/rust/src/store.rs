/* src/core/rust/src/store.rs */

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ssr::SsrState;

/// A named slice of the state tree. Its serialized form lives under `ID`.
pub trait StoreState: Serialize + DeserializeOwned + Default {
  const ID: &'static str;
}

/// Plain-data copy of the whole tree, tagged with the mutation count that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
  pub version: u64,
  pub state: SsrState,
}

pub type Listener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

#[derive(Default)]
struct TreeInner {
  state: SsrState,
  version: u64,
  hydrated: bool,
}

/// Reactive store tree shared by every store of one render tree.
///
/// Each effective mutation bumps `version` and notifies listeners synchronously with a
/// full snapshot. Listeners must not mutate the tree.
#[derive(Clone, Default)]
pub struct StateTree {
  inner: Arc<Mutex<TreeInner>>,
  listeners: Arc<RwLock<Vec<Listener>>>,
}

impl StateTree {
  pub fn new() -> Self {
    Self::default()
  }

  /// Current value of a store; absent or malformed slices read as the default.
  pub fn read<S: StoreState>(&self) -> S {
    let inner = self.inner.lock();
    decode(inner.state.get(S::ID))
  }

  /// Mutate one store. Listeners only hear about changes that alter the serialized form.
  pub fn update<S: StoreState, R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
    let (result, snapshot) = {
      let mut inner = self.inner.lock();
      let mut store: S = decode(inner.state.get(S::ID));
      let result = f(&mut store);
      let value = match serde_json::to_value(&store) {
        Ok(value) => value,
        Err(e) => {
          tracing::warn!(store = S::ID, error = %e, "store state is not serializable");
          return result;
        }
      };
      if inner.state.get(S::ID) == Some(&value) {
        return result;
      }
      inner.state.insert(S::ID.to_string(), value);
      inner.version += 1;
      (result, Snapshot { version: inner.version, state: inner.state.clone() })
    };
    self.notify(&snapshot);
    result
  }

  pub fn snapshot(&self) -> Snapshot {
    let inner = self.inner.lock();
    Snapshot { version: inner.version, state: inner.state.clone() }
  }

  pub fn version(&self) -> u64 {
    self.inner.lock().version
  }

  pub fn subscribe(&self, listener: impl Fn(&Snapshot) + Send + Sync + 'static) {
    self.listeners.write().push(Arc::new(listener));
  }

  /// Replace the whole tree with a hydrated snapshot.
  ///
  /// Only a JSON object is accepted, and only once, before any store has been mutated.
  /// Returns whether the snapshot was applied.
  pub fn hydrate(&self, snapshot: &Value) -> bool {
    let Value::Object(map) = snapshot else {
      return false;
    };
    let mut inner = self.inner.lock();
    if inner.hydrated || inner.version > 0 {
      tracing::debug!(version = inner.version, "store already initialized; snapshot ignored");
      return false;
    }
    inner.state = map.clone();
    inner.hydrated = true;
    true
  }

  fn notify(&self, snapshot: &Snapshot) {
    let listeners: Vec<Listener> = self.listeners.read().clone();
    for listener in listeners {
      listener(snapshot);
    }
  }
}

fn decode<S: StoreState>(value: Option<&Value>) -> S {
  value.and_then(|v| serde_json::from_value(v.clone()).ok()).unwrap_or_default()
}
