/* src/core/rust/src/locale_store.rs */

use serde::{Deserialize, Serialize};

use crate::locale::{Locale, LocaleSet};
use crate::store::{StateTree, StoreState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleState {
  #[serde(default)]
  pub current: String,
}

impl StoreState for LocaleState {
  const ID: &'static str = "locale";
}

/// Current locale of the render tree, stored in the state tree so it is snapshotted.
#[derive(Clone)]
pub struct LocaleStore {
  tree: StateTree,
  locales: LocaleSet,
}

impl LocaleStore {
  pub fn new(tree: StateTree, locales: LocaleSet) -> Self {
    Self { tree, locales }
  }

  /// Whatever the tree holds, validated; an empty or unknown value reads as the default.
  pub fn current(&self) -> Locale {
    self.locales.resolve(&self.tree.read::<LocaleState>().current)
  }

  /// Store `locale` if supported, otherwise the default. Never fails.
  pub fn set_locale(&self, locale: &str) -> Locale {
    let next = self.locales.resolve(locale);
    self.tree.update::<LocaleState, _>(|s| s.current = next.as_str().to_string());
    next
  }
}
