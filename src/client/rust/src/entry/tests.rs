/* src/client/rust/src/entry/tests.rs */

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::json;
use vessel_core::ssr::into_state;
use vessel_core::{ApiError, AuthStatus, BoxFuture, GoogleLogin, SsrState};

use super::*;

#[derive(Default)]
struct Source {
  fetched: Mutex<Vec<String>>,
}

impl SsrDataSource for Source {
  fn fetch<'a>(&'a self, full_path: &'a str) -> BoxFuture<'a, Result<SsrState, ApiError>> {
    Box::pin(async move {
      self.fetched.lock().push(full_path.to_string());
      Ok(into_state(json!({ "page": full_path })))
    })
  }
}

#[derive(Default)]
struct Auth {
  checks: AtomicUsize,
}

impl AuthApi for Auth {
  fn session(&self) -> BoxFuture<'_, Result<Option<SessionRecord>, ApiError>> {
    self.checks.fetch_add(1, Ordering::SeqCst);
    Box::pin(async { Err(ApiError::Network("offline".into())) })
  }

  fn login_google<'a>(
    &'a self,
    _: &'a GoogleLogin,
  ) -> BoxFuture<'a, Result<SessionRecord, ApiError>> {
    Box::pin(async { Err(ApiError::InvalidResponse) })
  }

  fn request_email_code<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<(), ApiError>> {
    Box::pin(async { Ok(()) })
  }

  fn verify_email_code<'a>(
    &'a self,
    _: &'a str,
    _: &'a str,
  ) -> BoxFuture<'a, Result<SessionRecord, ApiError>> {
    Box::pin(async { Err(ApiError::InvalidResponse) })
  }

  fn logout(&self) -> BoxFuture<'_, Result<(), ApiError>> {
    Box::pin(async { Ok(()) })
  }
}

/// Records what the tree looked like at mount time.
#[derive(Default)]
struct Recorder {
  mounted: Option<(String, Value)>,
  fail: bool,
}

impl Mount for Recorder {
  fn mount(&mut self, tree: &RenderTree) -> Result<(), ClientError> {
    if self.fail {
      return Err(ClientError::Mount("no #app element".into()));
    }
    self.mounted = Some((tree.i18n().active_locale().to_string(), tree.ssr().to_value()));
    Ok(())
  }
}

struct Fixture {
  entry: ClientEntry,
  source: Arc<Source>,
  auth: Arc<Auth>,
  prefs: Arc<MemoryPreferences>,
}

fn fixture(prefs: MemoryPreferences) -> Fixture {
  let locales = LocaleSet::new(["en", "zh-CN"], "en").unwrap();
  let routes = RouteTable::new()
    .route("/", ())
    .and_then(|t| t.route("/hi/:name", ()))
    .and_then(RouteTable::with_locale_prefix)
    .unwrap();
  let source = Arc::new(Source::default());
  let auth = Arc::new(Auth::default());
  let prefs = Arc::new(prefs);
  let entry = ClientEntry::new(locales, routes, source.clone())
    .auth(auth.clone())
    .preferences(prefs.clone());
  Fixture { entry, source, auth, prefs }
}

fn session_payload() -> Value {
  json!({
    "session_token": "tok",
    "user": {"id": "1", "name": "Ann", "email": "ann@x.io", "provider": "google"}
  })
}

#[tokio::test]
async fn inline_payload_boot_skips_fetch_and_session_check() {
  let f = fixture(MemoryPreferences::default());
  let mut payload =
    Some(json!({"page": "inline", "locale": "zh-CN", "session": session_payload()}));
  let mut mount = Recorder::default();

  let app = f.entry.boot("/zh-CN/hi/bob", &mut payload, &mut mount).await.unwrap();

  assert!(f.source.fetched.lock().is_empty());
  assert_eq!(f.auth.checks.load(Ordering::SeqCst), 0);
  assert!(payload.is_none());
  let (lang, state) = mount.mounted.unwrap();
  assert_eq!(lang, "zh-CN");
  assert_eq!(state["page"], "inline");
  assert_eq!(app.lang(), "zh-CN");
  let session = app.session().unwrap();
  assert!(session.is_authenticated());
  assert_eq!(session.status(), AuthStatus::Authenticated);
}

#[tokio::test]
async fn missing_payload_fetches_before_mount() {
  let f = fixture(MemoryPreferences::default());
  let mut payload = None;
  let mut mount = Recorder::default();

  let app = f.entry.boot("/hi/bob?title=Dr", &mut payload, &mut mount).await.unwrap();
  app.session_settled().await;

  assert_eq!(*f.source.fetched.lock(), vec!["/hi/bob?title=Dr"]);
  assert_eq!(mount.mounted.unwrap().1["page"], "/hi/bob?title=Dr");
  assert_eq!(f.auth.checks.load(Ordering::SeqCst), 1);
  assert!(!app.session().unwrap().is_authenticated());
}

#[tokio::test]
async fn later_navigations_fetch_and_persist_locale() {
  let f = fixture(MemoryPreferences::default());
  let mut payload = Some(json!({"page": "inline"}));
  let app = f.entry.boot("/", &mut payload, &mut Recorder::default()).await.unwrap();
  assert!(f.source.fetched.lock().is_empty());

  app.navigate("/hi/ann").await.unwrap();
  assert_eq!(*f.source.fetched.lock(), vec!["/hi/ann"]);

  app.switch_locale("zh-CN").await.unwrap();
  assert_eq!(app.tree().router().current().unwrap().path, "/zh-CN/hi/ann");
  assert_eq!(app.lang(), "zh-CN");
  assert_eq!(f.prefs.locale().as_deref(), Some("zh-CN"));
}

#[tokio::test]
async fn saved_locale_is_overridden_by_url_and_rewritten() {
  let f = fixture(MemoryPreferences::with_locale("zh-CN"));
  let mut payload = Some(json!({"page": "inline"}));
  let app = f.entry.boot("/", &mut payload, &mut Recorder::default()).await.unwrap();
  assert_eq!(app.lang(), "en");
  assert_eq!(f.prefs.locale().as_deref(), Some("en"));
}

#[tokio::test]
async fn failed_mount_keeps_payload() {
  let f = fixture(MemoryPreferences::default());
  let mut payload = Some(json!({"page": "inline"}));
  let mut mount = Recorder { fail: true, ..Recorder::default() };
  let err = f.entry.boot("/", &mut payload, &mut mount).await.err().unwrap();
  assert!(matches!(err, ClientError::Mount(_)));
  assert!(payload.is_some());
}

#[tokio::test]
async fn boot_from_html_reads_embedded_payload() {
  let f = fixture(MemoryPreferences::default());
  let html = vessel_injector::assemble_page(
    "<html><head></head><body><!--app-html--></body></html>",
    "<div id=\"app\"></div>",
    "",
    "en",
    &json!({"page": "embedded"}),
  );
  let mut mount = Recorder::default();
  f.entry.boot_html("/", &html, &mut mount).await.unwrap();
  assert!(f.source.fetched.lock().is_empty());
  assert_eq!(mount.mounted.unwrap().1["page"], "embedded");
}

/// Session service that never answers.
struct HungAuth;

impl AuthApi for HungAuth {
  fn session(&self) -> BoxFuture<'_, Result<Option<SessionRecord>, ApiError>> {
    Box::pin(std::future::pending())
  }

  fn login_google<'a>(
    &'a self,
    _: &'a GoogleLogin,
  ) -> BoxFuture<'a, Result<SessionRecord, ApiError>> {
    Box::pin(std::future::pending())
  }

  fn request_email_code<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<(), ApiError>> {
    Box::pin(std::future::pending())
  }

  fn verify_email_code<'a>(
    &'a self,
    _: &'a str,
    _: &'a str,
  ) -> BoxFuture<'a, Result<SessionRecord, ApiError>> {
    Box::pin(std::future::pending())
  }

  fn logout(&self) -> BoxFuture<'_, Result<(), ApiError>> {
    Box::pin(std::future::pending())
  }
}

#[tokio::test]
async fn unanswered_session_check_does_not_delay_mount() {
  let f = fixture(MemoryPreferences::default());
  let entry = f.entry.auth(Arc::new(HungAuth));
  let mut payload = Some(json!({"page": "inline"}));
  let mut mount = Recorder::default();

  let booted = tokio::time::timeout(
    std::time::Duration::from_millis(500),
    entry.boot("/", &mut payload, &mut mount),
  )
  .await;

  let app = booted.expect("boot waited on the session check").unwrap();
  assert_eq!(mount.mounted.unwrap().1["page"], "inline");
  assert!(payload.is_none());
  assert!(!app.session().unwrap().is_authenticated());
}

#[tokio::test]
async fn from_config_uses_client_section() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::create_dir(dir.path().join("locales")).unwrap();
  std::fs::write(dir.path().join("locales/zh-CN.json"), r#"{"hello":"你好"}"#).unwrap();
  let config = vessel_core::parse_config(
    r#"
[i18n]
locales = ["en", "zh-CN"]
messages_dir = "locales"

[client]
base_url = "http://127.0.0.1:9"
preference_file = "state/prefs.json"
"#,
    Path::new("vessel.toml"),
  )
  .unwrap();
  let routes = RouteTable::new().route("/", ()).and_then(RouteTable::with_locale_prefix).unwrap();
  let entry = ClientEntry::from_config(&config, dir.path(), routes).unwrap();
  assert!(entry.locales().is_supported("zh-CN"));

  let mut payload = Some(json!({"page": "inline", "session": session_payload()}));
  let app = entry.boot("/zh-CN", &mut payload, &mut Recorder::default()).await.unwrap();
  assert_eq!(app.tree().i18n().t("hello"), "你好");
  let saved = std::fs::read_to_string(dir.path().join("state/prefs.json")).unwrap();
  assert!(saved.contains("zh-CN"));
}
