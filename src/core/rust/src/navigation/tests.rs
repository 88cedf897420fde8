/* src/core/rust/src/navigation/tests.rs */

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;

use super::*;
use crate::i18n::Catalogs;
use crate::ssr::into_state;
use crate::store::StateTree;

#[derive(Default)]
struct Source {
  fetched: Mutex<Vec<String>>,
  fail: bool,
  /// Path whose fetch blocks until `release` is notified.
  gated: Option<&'static str>,
  started: Notify,
  release: Notify,
}

impl Source {
  fn fetched(&self) -> Vec<String> {
    self.fetched.lock().clone()
  }
}

impl SsrDataSource for Source {
  fn fetch<'a>(&'a self, full_path: &'a str) -> BoxFuture<'a, Result<SsrState, ApiError>> {
    Box::pin(async move {
      self.fetched.lock().push(full_path.to_string());
      if self.gated == Some(full_path) {
        self.started.notify_one();
        self.release.notified().await;
      }
      if self.fail {
        return Err(ApiError::Network("connection refused".into()));
      }
      Ok(into_state(json!({ "page": full_path })))
    })
  }
}

struct Fixture {
  router: Router,
  ssr: SsrContext,
  i18n: I18n,
  store: LocaleStore,
  source: Arc<Source>,
}

fn routes() -> RouteTable {
  RouteTable::new()
    .route("/", ())
    .and_then(|t| t.route("/page", ()))
    .and_then(|t| t.route("/other", ()))
    .and_then(RouteTable::with_locale_prefix)
    .unwrap()
}

fn fixture(side: Side, source: Source, initial: serde_json::Value) -> Fixture {
  let locales = LocaleSet::new(["en", "fr"], "en").unwrap();
  let ssr = SsrContext::from_value(initial);
  let i18n = I18n::new(locales.clone(), Arc::new(Catalogs::new()), "en");
  let store = LocaleStore::new(StateTree::new(), locales.clone());
  let source = Arc::new(source);
  let mut stages: Vec<Box<dyn NavigationStage>> = vec![
    Box::new(LocaleCheck::new(locales.clone())),
    Box::new(LocaleSync::new(i18n.clone(), store.clone(), ssr.clone())),
  ];
  if side == Side::Client {
    stages.push(Box::new(DataFetch::new(source.clone(), ssr.clone())));
  }
  let router = Router::new(side, routes(), locales, stages);
  Fixture { router, ssr, i18n, store, source }
}

fn committed_path(outcome: NavigationOutcome) -> String {
  match outcome {
    NavigationOutcome::Committed { location, .. } => location.full_path(),
    NavigationOutcome::Superseded => panic!("navigation was superseded"),
  }
}

#[test]
fn stages_run_in_fixed_order() {
  let f = fixture(Side::Client, Source::default(), json!({}));
  assert_eq!(f.router.stage_names(), vec!["locale-check", "locale-sync", "data-fetch"]);
}

#[tokio::test]
async fn unsupported_locale_redirects_without_fetch() {
  let f = fixture(Side::Client, Source::default(), json!({}));
  f.router.push("/").await.unwrap();

  let out = f.router.push("/xx/page?tab=1").await.unwrap();
  assert_eq!(committed_path(out), "/page?tab=1");
  assert_eq!(f.source.fetched(), vec!["/page?tab=1"]);
}

#[tokio::test]
async fn first_navigation_never_fetches() {
  let f = fixture(Side::Client, Source::default(), json!({"page": "inline"}));
  f.router.push("/page").await.unwrap();
  assert!(f.source.fetched().is_empty());
  assert_eq!(f.ssr.get("page"), Some(json!("inline")));

  f.router.push("/other").await.unwrap();
  assert_eq!(f.source.fetched(), vec!["/other"]);
  assert_eq!(f.ssr.get("page"), Some(json!("/other")));
}

#[tokio::test]
async fn same_path_is_not_refetched() {
  let f = fixture(Side::Client, Source::default(), json!({}));
  f.router.push("/").await.unwrap();
  f.router.push("/page").await.unwrap();
  f.router.push("/page").await.unwrap();
  assert_eq!(f.source.fetched(), vec!["/page"]);
}

#[tokio::test]
async fn fetched_data_is_spread_over_existing_state() {
  let f = fixture(Side::Client, Source::default(), json!({"keep": true, "page": "old"}));
  f.router.push("/").await.unwrap();
  f.router.push("/page").await.unwrap();
  assert_eq!(f.ssr.get("keep"), Some(json!(true)));
  assert_eq!(f.ssr.get("page"), Some(json!("/page")));
}

#[tokio::test]
async fn failed_fetch_resets_state_and_still_commits() {
  let source = Source { fail: true, ..Source::default() };
  let f = fixture(Side::Client, source, json!({"page": "stale"}));
  f.router.push("/").await.unwrap();
  let out = f.router.push("/page").await.unwrap();
  assert_eq!(committed_path(out), "/page");
  assert!(f.ssr.is_empty());
}

#[tokio::test]
async fn locale_sync_updates_store_i18n_and_ssr() {
  let f = fixture(Side::Server, Source::default(), json!({}));
  f.router.push("/fr/page").await.unwrap();
  assert_eq!(f.store.current(), "fr");
  assert_eq!(f.i18n.active_locale(), "fr");
  assert_eq!(f.ssr.get(LOCALE_KEY), Some(json!("fr")));

  f.router.push("/page").await.unwrap();
  assert_eq!(f.store.current(), "en");
  assert_eq!(f.i18n.active_locale(), "en");
  assert_eq!(f.ssr.get(LOCALE_KEY), Some(json!("en")));
}

#[tokio::test]
async fn server_side_never_fetches() {
  let f = fixture(Side::Server, Source::default(), json!({}));
  f.router.push("/").await.unwrap();
  f.router.push("/page").await.unwrap();
  assert!(f.source.fetched().is_empty());
}

#[tokio::test]
async fn late_fetch_for_abandoned_navigation_is_discarded() {
  let source = Source { gated: Some("/page"), ..Source::default() };
  let f = fixture(Side::Client, source, json!({}));
  f.router.push("/").await.unwrap();

  let router = f.router.clone();
  let slow = tokio::spawn(async move { router.push("/page").await });
  f.source.started.notified().await;

  let out = f.router.push("/other").await.unwrap();
  assert_eq!(committed_path(out), "/other");

  f.source.release.notify_one();
  let slow = slow.await.unwrap().unwrap();
  assert_eq!(slow, NavigationOutcome::Superseded);
  assert_eq!(f.ssr.get("page"), Some(json!("/other")));
  assert_eq!(f.router.current().map(|l| l.path), Some("/other".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn abandoned_fetch_keeps_newer_locale_write() {
  let source = Source { gated: Some("/page"), ..Source::default() };
  let f = fixture(Side::Client, source, json!({}));
  f.router.push("/").await.unwrap();

  let router = f.router.clone();
  let slow = tokio::spawn(async move { router.push("/page").await });
  f.source.started.notified().await;

  f.router.push("/fr/other").await.unwrap();
  f.source.release.notify_one();
  assert_eq!(slow.await.unwrap().unwrap(), NavigationOutcome::Superseded);

  assert_eq!(f.ssr.get("locale"), Some(json!("fr")));
  assert_eq!(f.ssr.get("page"), Some(json!("/fr/other")));
  assert_eq!(f.i18n.active_locale(), "fr");
}

#[tokio::test]
async fn resolve_route_uses_current_locale_unless_explicit() {
  let f = fixture(Side::Server, Source::default(), json!({}));
  f.router.push("/fr").await.unwrap();
  assert_eq!(f.router.resolve_route("/page", None).full_path(), "/fr/page");
  assert_eq!(f.router.resolve_route("/page", Some("en")).full_path(), "/page");
  assert_eq!(f.router.resolve_route("/fr/page#top", Some("en")).full_path(), "/page#top");

  let out = f.router.push_localized("/other", None).await.unwrap();
  assert_eq!(committed_path(out), "/fr/other");
}

struct Bounce;

impl NavigationStage for Bounce {
  fn name(&self) -> &'static str {
    "bounce"
  }

  fn run<'a>(&'a self, transition: &'a Transition) -> BoxFuture<'a, StageOutcome> {
    let next = if transition.to.path == "/a" { "/b" } else { "/a" };
    Box::pin(async move { StageOutcome::Redirect(Location::parse(next)) })
  }
}

#[tokio::test]
async fn redirect_loop_is_reported() {
  let locales = LocaleSet::new(["en"], "en").unwrap();
  let stages: Vec<Box<dyn NavigationStage>> = vec![Box::new(Bounce)];
  let router = Router::new(Side::Server, RouteTable::new(), locales, stages);
  let err = router.push("/a").await.unwrap_err();
  assert!(matches!(err, NavigationError::RedirectLoop { .. }));
  assert!(router.current().is_none());
}

#[tokio::test]
async fn unmatched_path_takes_locale_from_first_segment() {
  let f = fixture(Side::Server, Source::default(), json!({}));
  let out = f.router.push("/fr/not/a/route").await.unwrap();
  assert_eq!(committed_path(out), "/fr/not/a/route");
  assert_eq!(f.store.current(), "fr");
  f.router.push("/nowhere").await.unwrap();
  assert_eq!(f.store.current(), "en");
}
