/* src/core/rust/src/route.rs */

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::errors::ConfigError;
use crate::locale::{ensure_leading_slash, join_segments, split_segments};

/// Name of the parameter that carries the locale segment in prefixed routes.
pub const LOCALE_PARAM: &str = "locale";

/// A navigation target: normalized path plus the untouched query and hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
  pub path: String,
  pub query: Option<String>,
  pub hash: Option<String>,
}

impl Location {
  /// Parse `path?query#hash`. The path gets a leading slash and loses empty segments.
  pub fn parse(full_path: &str) -> Self {
    let (rest, hash) = match full_path.split_once('#') {
      Some((rest, hash)) => (rest, Some(hash.to_string())),
      None => (full_path, None),
    };
    let (path, query) = match rest.split_once('?') {
      Some((path, query)) => (path, Some(query.to_string())),
      None => (rest, None),
    };
    Self {
      path: normalize_path(path),
      query: query.filter(|q| !q.is_empty()),
      hash: hash.filter(|h| !h.is_empty()),
    }
  }

  /// Same query and hash, different path.
  pub fn with_path(&self, path: &str) -> Self {
    Self { path: normalize_path(path), query: self.query.clone(), hash: self.hash.clone() }
  }

  pub fn full_path(&self) -> String {
    let mut out = self.path.clone();
    if let Some(ref q) = self.query {
      out.push('?');
      out.push_str(q);
    }
    if let Some(ref h) = self.hash {
      out.push('#');
      out.push_str(h);
    }
    out
  }
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.full_path())
  }
}

fn normalize_path(path: &str) -> String {
  join_segments(&split_segments(&ensure_leading_slash(path)))
}

/// A matched route parameter. Catch-all segments (`*name`) match several segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
  One(String),
  Many(Vec<String>),
}

impl ParamValue {
  /// First non-empty string carried by the parameter.
  pub fn candidate(&self) -> Option<&str> {
    match self {
      Self::One(value) => Some(value.as_str()).filter(|v| !v.is_empty()),
      Self::Many(values) => values.iter().map(String::as_str).find(|v| !v.is_empty()),
    }
  }

  /// Flattened form handed to data handlers.
  pub fn joined(&self) -> String {
    match self {
      Self::One(value) => value.clone(),
      Self::Many(values) => values.join("/"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
  pub pattern: String,
  pub params: BTreeMap<String, ParamValue>,
}

impl RouteMatch {
  pub fn param(&self, name: &str) -> Option<&ParamValue> {
    self.params.get(name)
  }

  /// Raw locale segment, if the matched route is locale-prefixed.
  pub fn locale_param(&self) -> Option<&ParamValue> {
    self.params.get(LOCALE_PARAM)
  }

  pub fn locale_candidate(&self) -> Option<&str> {
    self.locale_param().and_then(ParamValue::candidate)
  }
}

struct CompiledRoute<T> {
  pattern: String,
  regex: Regex,
  params: Vec<(String, bool)>,
  value: T,
}

/// Ordered route patterns (`/hi/:name`, `/docs/*slug`), first match wins.
pub struct RouteTable<T = ()> {
  routes: Vec<CompiledRoute<T>>,
}

impl<T> RouteTable<T> {
  pub fn new() -> Self {
    Self { routes: Vec::new() }
  }

  pub fn insert(&mut self, pattern: &str, value: T) -> Result<(), ConfigError> {
    let pattern = normalize_path(pattern);
    let (regex, params) = compile_pattern(&pattern)?;
    self.routes.push(CompiledRoute { pattern, regex, params, value });
    Ok(())
  }

  pub fn route(mut self, pattern: &str, value: T) -> Result<Self, ConfigError> {
    self.insert(pattern, value)?;
    Ok(self)
  }

  pub fn patterns(&self) -> impl Iterator<Item = &str> {
    self.routes.iter().map(|r| r.pattern.as_str())
  }

  pub fn len(&self) -> usize {
    self.routes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.routes.is_empty()
  }

  pub fn match_path(&self, path: &str) -> Option<(RouteMatch, &T)> {
    let path = normalize_path(path);
    self.routes.iter().find_map(|route| {
      let caps = route.regex.captures(&path)?;
      let mut params = BTreeMap::new();
      for (idx, (name, catch_all)) in route.params.iter().enumerate() {
        let raw = caps.get(idx + 1).map(|m| m.as_str()).unwrap_or_default();
        let value = if *catch_all {
          ParamValue::Many(raw.split('/').map(String::from).collect())
        } else {
          ParamValue::One(raw.to_string())
        };
        params.insert(name.clone(), value);
      }
      Some((RouteMatch { pattern: route.pattern.clone(), params }, &route.value))
    })
  }
}

impl<T: Clone> RouteTable<T> {
  /// Register `/:locale{pattern}` for every route, after the unprefixed ones, so the
  /// first segment only becomes a locale candidate when no plain route matches.
  pub fn with_locale_prefix(mut self) -> Result<Self, ConfigError> {
    let base: Vec<(String, T)> =
      self.routes.iter().map(|r| (r.pattern.clone(), r.value.clone())).collect();
    for (pattern, value) in base {
      let prefixed = if pattern == "/" {
        format!("/:{LOCALE_PARAM}")
      } else {
        format!("/:{LOCALE_PARAM}{pattern}")
      };
      self.insert(&prefixed, value)?;
    }
    Ok(self)
  }
}

impl<T> Default for RouteTable<T> {
  fn default() -> Self {
    Self::new()
  }
}

fn compile_pattern(pattern: &str) -> Result<(Regex, Vec<(String, bool)>), ConfigError> {
  let mut params = Vec::new();
  let mut parts = Vec::new();
  for segment in split_segments(pattern) {
    if let Some(name) = segment.strip_prefix(':') {
      params.push((name.to_string(), false));
      parts.push("([^/]+)".to_string());
    } else if let Some(name) = segment.strip_prefix('*') {
      params.push((name.to_string(), true));
      parts.push("(.+)".to_string());
    } else {
      parts.push(regex::escape(segment));
    }
  }
  if params.iter().any(|(name, _)| name.is_empty()) {
    return Err(ConfigError::Invalid(format!("unnamed parameter in route {pattern:?}")));
  }
  let source = format!("^/{}$", parts.join("/"));
  let regex = Regex::new(&source)
    .map_err(|e| ConfigError::Invalid(format!("invalid route {pattern:?}: {e}")))?;
  Ok((regex, params))
}
