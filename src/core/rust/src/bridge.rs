/* src/core/rust/src/bridge.rs */

//! Carries the store tree across the server/client boundary through the SSR state.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::ssr::{STORE_KEY, SsrContext, SsrState};
use crate::store::{Snapshot, StateTree};

/// Server side: publish the tree into `ssr` now and after every change.
///
/// Each publish spreads the snapshot over whatever else the SSR state holds. A snapshot
/// older than one already published is dropped.
pub fn attach(tree: &StateTree, ssr: &SsrContext) {
  let published = Arc::new(Mutex::new(None::<u64>));
  publish(ssr, &tree.snapshot(), &published);

  let ssr = ssr.clone();
  tree.subscribe(move |snapshot| publish(&ssr, snapshot, &published));
}

fn publish(ssr: &SsrContext, snapshot: &Snapshot, published: &Mutex<Option<u64>>) {
  let mut last = published.lock();
  if last.is_some_and(|v| v > snapshot.version) {
    tracing::debug!(version = snapshot.version, "stale store snapshot skipped");
    return;
  }
  ssr.update(|state| {
    state.insert(STORE_KEY.to_string(), Value::Object(snapshot.state.clone()));
  });
  *last = Some(snapshot.version);
}

/// Client side: seed the tree from the inbound payload's snapshot.
///
/// Anything other than a JSON object under the reserved key leaves the defaults in place.
pub fn hydrate(tree: &StateTree, payload: &SsrState) -> bool {
  match payload.get(STORE_KEY) {
    Some(snapshot @ Value::Object(_)) => tree.hydrate(snapshot),
    Some(other) => {
      tracing::debug!(kind = json_kind(other), "malformed store snapshot ignored");
      false
    }
    None => false,
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
