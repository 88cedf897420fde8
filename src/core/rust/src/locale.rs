/* src/core/rust/src/locale.rs */

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::ConfigError;
use crate::route::ParamValue;

/// A locale tag that has been checked against a [`LocaleSet`].
///
/// Only a `LocaleSet` hands these out, so holding one means the tag is supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Locale {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for Locale {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl PartialEq<str> for Locale {
  fn eq(&self, other: &str) -> bool {
    self.0 == other
  }
}

impl PartialEq<&str> for Locale {
  fn eq(&self, other: &&str) -> bool {
    self.0 == *other
  }
}

#[derive(Debug)]
struct LocaleSetInner {
  supported: Vec<Locale>,
  default: Locale,
}

/// The enumerated set of supported locales with its designated default.
///
/// Cheap to clone; every render tree holds its own handle.
#[derive(Debug, Clone)]
pub struct LocaleSet {
  inner: Arc<LocaleSetInner>,
}

impl LocaleSet {
  pub fn new<I, S>(supported: I, default: &str) -> Result<Self, ConfigError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut tags: Vec<Locale> = Vec::new();
    for tag in supported {
      let tag: String = tag.into();
      let tag = tag.trim();
      if tag.is_empty() || tag.contains('/') {
        return Err(ConfigError::Invalid(format!("invalid locale tag {tag:?}")));
      }
      if !tags.iter().any(|t| t == tag) {
        tags.push(Locale(tag.to_string()));
      }
    }
    if tags.is_empty() {
      return Err(ConfigError::Invalid("locale set must not be empty".into()));
    }
    let default = tags
      .iter()
      .find(|t| *t == default)
      .cloned()
      .ok_or_else(|| ConfigError::Invalid(format!("default locale {default:?} is not supported")))?;
    Ok(Self { inner: Arc::new(LocaleSetInner { supported: tags, default }) })
  }

  /// Build a set from catalog names: `en` is the default when present, else the first name.
  pub fn from_catalog_keys<I, S>(keys: I) -> Result<Self, ConfigError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    let default = if keys.iter().any(|k| k == "en") {
      "en".to_string()
    } else {
      keys.first().cloned().unwrap_or_default()
    };
    Self::new(keys, &default)
  }

  pub fn default_locale(&self) -> &Locale {
    &self.inner.default
  }

  pub fn supported(&self) -> &[Locale] {
    &self.inner.supported
  }

  pub fn is_supported(&self, candidate: &str) -> bool {
    self.lookup(candidate).is_some()
  }

  pub fn is_default(&self, candidate: &str) -> bool {
    self.inner.default == candidate
  }

  fn lookup(&self, candidate: &str) -> Option<&Locale> {
    self.inner.supported.iter().find(|t| *t == candidate)
  }

  /// Validated locale, collapsing unknown values to the default.
  pub fn resolve(&self, candidate: &str) -> Locale {
    self.lookup(candidate).unwrap_or(&self.inner.default).clone()
  }

  /// Case-insensitive match, used where tags arrive from headers or cookies.
  pub fn canonicalize(&self, candidate: &str) -> Option<Locale> {
    self.inner.supported.iter().find(|t| t.as_str().eq_ignore_ascii_case(candidate)).cloned()
  }

  /// Exact validation of a route parameter. Returns `None` on mismatch rather than
  /// the default so callers can tell "absent" apart from "invalid".
  pub fn normalize_locale_param(&self, candidate: Option<&str>) -> Option<Locale> {
    candidate.and_then(|c| self.lookup(c)).cloned()
  }

  /// Explicit locale wins, then the locale segment of the active route, then the default.
  pub fn resolve_effective_locale(
    &self,
    explicit: Option<&str>,
    route_locale: Option<&ParamValue>,
  ) -> Locale {
    if let Some(explicit) = explicit {
      return self.resolve(explicit);
    }
    route_locale
      .and_then(ParamValue::candidate)
      .and_then(|c| self.lookup(c))
      .unwrap_or(&self.inner.default)
      .clone()
  }

  /// Drop the leading segment only when it is the default locale.
  pub fn strip_locale_segment(&self, path: &str) -> String {
    let mut segments = split_segments(path);
    if segments.first().is_some_and(|s| self.inner.default == *s) {
      segments.remove(0);
    }
    join_segments(&segments)
  }

  /// Remove any supported locale from the front of the path.
  pub fn canonical_path(&self, path: &str) -> String {
    let mut segments = split_segments(path);
    if segments.first().is_some_and(|s| self.is_supported(s)) {
      segments.remove(0);
    }
    join_segments(&segments)
  }

  /// Prefix `locale` onto the canonical form of `path`. The default locale is never shown.
  pub fn add_locale_segment(&self, locale: &str, path: &str) -> String {
    let locale = self.resolve(locale);
    let canonical = self.canonical_path(path);
    if locale == self.inner.default {
      return canonical;
    }
    if canonical == "/" { format!("/{locale}") } else { format!("/{locale}{canonical}") }
  }

  /// Locale carried by the first path segment (case-insensitive), else the default.
  pub fn locale_from_path(&self, path: &str) -> Locale {
    split_segments(path)
      .first()
      .and_then(|s| self.canonicalize(s))
      .unwrap_or_else(|| self.inner.default.clone())
  }
}

/// Everything after the first segment; `/` when nothing remains.
pub fn path_suffix(path: &str) -> String {
  let segments = split_segments(path);
  join_segments(segments.get(1..).unwrap_or_default())
}

pub(crate) fn ensure_leading_slash(path: &str) -> String {
  if path.is_empty() {
    "/".to_string()
  } else if path.starts_with('/') {
    path.to_string()
  } else {
    format!("/{path}")
  }
}

pub(crate) fn split_segments(path: &str) -> Vec<&str> {
  path.split('/').filter(|s| !s.is_empty()).collect()
}

pub(crate) fn join_segments(segments: &[&str]) -> String {
  if segments.is_empty() { "/".to_string() } else { format!("/{}", segments.join("/")) }
}
