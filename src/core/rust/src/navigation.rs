/* src/core/rust/src/navigation.rs */

//! Ordered navigation pipeline: `locale-check`, `locale-sync`, `data-fetch`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use crate::api::{BoxFuture, SsrDataSource};
use crate::errors::{ApiError, NavigationError};
use crate::i18n::I18n;
use crate::locale::{LocaleSet, path_suffix};
use crate::locale_store::LocaleStore;
use crate::route::{Location, RouteMatch, RouteTable};
use crate::ssr::{LOCALE_KEY, SsrContext, SsrState, spread};

/// Redirects followed by one `push` before it gives up.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
  Server,
  Client,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
  Continue,
  /// Abort this transition and navigate to the given location instead.
  Redirect(Location),
  /// A newer navigation took over; nothing more to do for this one.
  Cancelled,
}

/// One route change as seen by the stages.
pub struct Transition {
  pub id: u64,
  pub to: Location,
  /// `None` on the first navigation of the render tree.
  pub from: Option<Location>,
  pub matched: Option<RouteMatch>,
  latest: Arc<AtomicU64>,
}

impl Transition {
  pub fn is_first(&self) -> bool {
    self.from.is_none()
  }

  /// False once a later navigation has started.
  pub fn is_current(&self) -> bool {
    self.latest.load(Ordering::SeqCst) == self.id
  }

  pub fn locale_candidate(&self) -> Option<&str> {
    self.matched.as_ref().and_then(RouteMatch::locale_candidate)
  }
}

pub trait NavigationStage: Send + Sync {
  fn name(&self) -> &'static str;

  fn run<'a>(&'a self, transition: &'a Transition) -> BoxFuture<'a, StageOutcome>;
}

/// Redirects a route whose locale segment is not supported to the default-locale path.
pub struct LocaleCheck {
  locales: LocaleSet,
}

impl LocaleCheck {
  pub fn new(locales: LocaleSet) -> Self {
    Self { locales }
  }

  fn check(&self, transition: &Transition) -> StageOutcome {
    let Some(candidate) = transition.locale_candidate() else {
      return StageOutcome::Continue;
    };
    if self.locales.normalize_locale_param(Some(candidate)).is_some() {
      return StageOutcome::Continue;
    }
    let default = self.locales.default_locale();
    let path = self.locales.add_locale_segment(default.as_str(), &path_suffix(&transition.to.path));
    StageOutcome::Redirect(transition.to.with_path(&path))
  }
}

impl NavigationStage for LocaleCheck {
  fn name(&self) -> &'static str {
    "locale-check"
  }

  fn run<'a>(&'a self, transition: &'a Transition) -> BoxFuture<'a, StageOutcome> {
    let outcome = self.check(transition);
    Box::pin(async move { outcome })
  }
}

/// Points the locale store, the i18n binding and the SSR `locale` key at the route's locale.
pub struct LocaleSync {
  i18n: I18n,
  store: LocaleStore,
  ssr: SsrContext,
}

impl LocaleSync {
  pub fn new(i18n: I18n, store: LocaleStore, ssr: SsrContext) -> Self {
    Self { i18n, store, ssr }
  }

  fn sync(&self, transition: &Transition) {
    let locales = self.i18n.locales();
    // Unknown routes still honour a supported leading segment.
    let effective = match transition.matched {
      Some(ref matched) => locales.resolve_effective_locale(None, matched.locale_param()),
      None => locales.locale_from_path(&transition.to.path),
    };

    if self.store.current() != effective || self.i18n.active_locale() != effective {
      self.store.set_locale(effective.as_str());
      self.i18n.set_active_locale(&effective);
    }

    let tag = Value::String(effective.to_string());
    self.ssr.update(|state| {
      if state.get(LOCALE_KEY) != Some(&tag) {
        state.insert(LOCALE_KEY.to_string(), tag);
      }
    });
  }
}

impl NavigationStage for LocaleSync {
  fn name(&self) -> &'static str {
    "locale-sync"
  }

  fn run<'a>(&'a self, transition: &'a Transition) -> BoxFuture<'a, StageOutcome> {
    self.sync(transition);
    Box::pin(async { StageOutcome::Continue })
  }
}

/// Client-only: refresh page data from the server on every navigation after the first.
pub struct DataFetch {
  source: Arc<dyn SsrDataSource>,
  ssr: SsrContext,
}

impl DataFetch {
  pub fn new(source: Arc<dyn SsrDataSource>, ssr: SsrContext) -> Self {
    Self { source, ssr }
  }

  async fn fetch(&self, transition: &Transition) -> StageOutcome {
    if transition.is_first() {
      return StageOutcome::Continue;
    }
    let target = transition.to.full_path();
    if transition.from.as_ref().is_some_and(|from| from.full_path() == target) {
      return StageOutcome::Continue;
    }

    let result = self.source.fetch(&target).await;
    // The guard and the merge share one lock, so a newer navigation's writes land after.
    let applied = self.ssr.update(|state| {
      if !transition.is_current() {
        return false;
      }
      merge_page_data(state, &target, result);
      true
    });
    if !applied {
      tracing::debug!(path = %target, "discarding page data for an abandoned navigation");
      return StageOutcome::Cancelled;
    }
    StageOutcome::Continue
  }
}

impl NavigationStage for DataFetch {
  fn name(&self) -> &'static str {
    "data-fetch"
  }

  fn run<'a>(&'a self, transition: &'a Transition) -> BoxFuture<'a, StageOutcome> {
    Box::pin(self.fetch(transition))
  }
}

/// Fetch page data for `full_path` and merge it into `ssr`, outside of any navigation.
pub async fn load_page_data(source: &dyn SsrDataSource, ssr: &SsrContext, full_path: &str) {
  let result = source.fetch(full_path).await;
  ssr.update(|state| merge_page_data(state, full_path, result));
}

fn merge_page_data(state: &mut SsrState, path: &str, result: Result<SsrState, ApiError>) {
  match result {
    Ok(data) => *state = spread(std::mem::take(state), data),
    Err(e) => {
      tracing::warn!(path, error = %e, "page data fetch failed; resetting SSR state");
      state.clear();
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
  Committed { location: Location, matched: Option<RouteMatch> },
  /// A later `push` started before this one finished.
  Superseded,
}

struct Current {
  location: Location,
  matched: Option<RouteMatch>,
}

/// Runs the stage pipeline for every route change of one render tree.
#[derive(Clone)]
pub struct Router {
  side: Side,
  routes: Arc<RouteTable>,
  locales: LocaleSet,
  stages: Arc<Vec<Box<dyn NavigationStage>>>,
  current: Arc<RwLock<Option<Current>>>,
  latest: Arc<AtomicU64>,
}

impl Router {
  pub fn new(
    side: Side,
    routes: impl Into<Arc<RouteTable>>,
    locales: LocaleSet,
    stages: Vec<Box<dyn NavigationStage>>,
  ) -> Self {
    Self {
      side,
      routes: routes.into(),
      locales,
      stages: Arc::new(stages),
      current: Arc::default(),
      latest: Arc::default(),
    }
  }

  pub fn side(&self) -> Side {
    self.side
  }

  pub fn stage_names(&self) -> Vec<&'static str> {
    self.stages.iter().map(|s| s.name()).collect()
  }

  pub fn current(&self) -> Option<Location> {
    self.current.read().as_ref().map(|c| c.location.clone())
  }

  pub fn current_match(&self) -> Option<RouteMatch> {
    self.current.read().as_ref().and_then(|c| c.matched.clone())
  }

  /// Navigate to `target`, following stage redirects. The route is committed only after
  /// every stage has run.
  pub async fn push(&self, target: &str) -> Result<NavigationOutcome, NavigationError> {
    let mut to = Location::parse(target);
    for _ in 0..=MAX_REDIRECTS {
      let transition = Transition {
        id: self.latest.fetch_add(1, Ordering::SeqCst) + 1,
        from: self.current(),
        matched: self.routes.match_path(&to.path).map(|(m, _)| m),
        to,
        latest: self.latest.clone(),
      };

      match self.run_stages(&transition).await {
        StageOutcome::Redirect(next) => to = next,
        StageOutcome::Cancelled => return Ok(NavigationOutcome::Superseded),
        StageOutcome::Continue => {
          let Transition { to, matched, .. } = transition;
          *self.current.write() = Some(Current { location: to.clone(), matched: matched.clone() });
          return Ok(NavigationOutcome::Committed { location: to, matched });
        }
      }
    }
    Err(NavigationError::RedirectLoop { path: target.to_string(), hops: MAX_REDIRECTS })
  }

  /// `target` under `locale`, or under the current route's locale when none is given.
  pub fn resolve_route(&self, target: &str, locale: Option<&str>) -> Location {
    let target = Location::parse(target);
    let current = self.current_match();
    let param = current.as_ref().and_then(RouteMatch::locale_param);
    let effective = self.locales.resolve_effective_locale(locale, param);
    target.with_path(&self.locales.add_locale_segment(effective.as_str(), &target.path))
  }

  pub async fn push_localized(
    &self,
    target: &str,
    locale: Option<&str>,
  ) -> Result<NavigationOutcome, NavigationError> {
    let location = self.resolve_route(target, locale);
    self.push(&location.full_path()).await
  }

  async fn run_stages(&self, transition: &Transition) -> StageOutcome {
    for stage in self.stages.iter() {
      match stage.run(transition).await {
        StageOutcome::Continue => {}
        StageOutcome::Redirect(next) => {
          tracing::debug!(
            stage = stage.name(),
            from = %transition.to,
            to = %next,
            "navigation redirected"
          );
          return StageOutcome::Redirect(next);
        }
        StageOutcome::Cancelled => return StageOutcome::Cancelled,
      }
      if !transition.is_current() {
        return StageOutcome::Cancelled;
      }
    }
    StageOutcome::Continue
  }
}

#[cfg(test)]
mod tests;
