/* src/client/rust/tests/http_roundtrip.rs */

use std::sync::Arc;

use axum::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};
use vessel_client::{ClientEntry, ClientError, HttpTransport, Mount};
use vessel_core::{ApiError, AuthStatus, LocaleSet, RenderTree, RouteTable, SsrDataSource};
use vessel_server_axum::{IntoAxumRouter, PageRequest, TemplateRenderer, VesselServer, data_handler};

const TEMPLATE: &str = "<html><head></head><body><!--app-html--></body></html>";

struct Noop;

impl Mount for Noop {
  fn mount(&mut self, _tree: &RenderTree) -> Result<(), ClientError> {
    Ok(())
  }
}

fn locales() -> LocaleSet {
  LocaleSet::new(["en", "zh-CN"], "en").unwrap()
}

fn client_routes() -> RouteTable {
  RouteTable::new()
    .route("/", ())
    .and_then(|t| t.route("/hi/:name", ()))
    .and_then(RouteTable::with_locale_prefix)
    .unwrap()
}

fn empty_envelope() -> Value {
  json!({"code": 0, "data": null, "message": ""})
}

fn user() -> Value {
  json!({"id": "7", "name": "Ann", "email": "ann@x.io", "provider": "email"})
}

async fn spawn_server() -> String {
  let hi = data_handler(|req: PageRequest| async move {
    let name = req.param("name").unwrap_or("friend").to_string();
    Ok(json!({ "greeting": format!("Hello, {name}!"), "locale": req.locale.as_str() }))
  });
  let pages = VesselServer::new(locales(), TEMPLATE)
    .renderer(TemplateRenderer::new("<div id=\"app\"><!--vessel:greeting--></div>"))
    .route("/")
    .and_then(|s| s.page_data("/hi/:name", hi))
    .unwrap()
    .into_axum_router()
    .unwrap();

  let auth = axum::Router::new()
    .route("/api/auth/session", get(|| async { Json(empty_envelope()) }))
    .route(
      "/api/auth/login/email/request",
      post(|Json(body): Json<Value>| async move {
        if body["email"] == "ann@x.io" {
          Json(json!({"code": 0, "data": null, "message": ""}))
        } else {
          Json(json!({"code": 1001, "data": null, "message": "unknown-email"}))
        }
      }),
    )
    .route(
      "/api/auth/login/email/verify",
      post(|Json(body): Json<Value>| async move {
        assert_eq!(body["email"], "ann@x.io");
        Json(json!({"code": 0, "data": {"session_token": "tok-7", "user": user()}, "message": ""}))
      }),
    )
    .route("/api/auth/logout", post(|| async { Json(empty_envelope()) }));

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, pages.merge(auth)).await.unwrap();
  });
  format!("http://{addr}")
}

#[tokio::test]
async fn boots_from_server_html_then_navigates_over_http() {
  let base = spawn_server().await;
  let html = reqwest::get(format!("{base}/zh-CN/hi/bob")).await.unwrap().text().await.unwrap();
  assert!(html.contains("Hello, bob!"));

  let transport = Arc::new(HttpTransport::new(&base).unwrap());
  let entry = ClientEntry::with_transport(locales(), client_routes(), transport);
  let app = entry.boot_html("/zh-CN/hi/bob", &html, &mut Noop).await.unwrap();
  assert_eq!(app.lang(), "zh-CN");
  assert_eq!(app.tree().ssr().get("greeting"), Some(json!("Hello, bob!")));

  app.navigate("/hi/ann").await.unwrap();
  assert_eq!(app.lang(), "en");
  assert_eq!(app.tree().ssr().get("greeting"), Some(json!("Hello, ann!")));
  assert_eq!(app.tree().ssr().get("locale"), Some(json!("en")));
}

#[tokio::test]
async fn email_login_flow() {
  let base = spawn_server().await;
  let transport = Arc::new(HttpTransport::new(&base).unwrap());
  let entry = ClientEntry::with_transport(locales(), client_routes(), transport);
  let app = entry.boot("/", &mut None, &mut Noop).await.unwrap();
  app.session_settled().await;
  let session = app.session().unwrap();
  assert!(!session.is_authenticated());

  let err = session.request_email_code("who@x.io").await.unwrap_err();
  assert_eq!(err.to_string(), "unknown-email");
  assert_eq!(session.status(), AuthStatus::Idle);

  session.request_email_code("ann@x.io").await.unwrap();
  session.verify_email_code("123456").await.unwrap();
  assert!(session.is_authenticated());
  assert_eq!(session.user().unwrap().name, "Ann");

  session.logout();
  assert!(!session.is_authenticated());
}

#[tokio::test]
async fn unknown_data_path_is_a_status_error() {
  let base = spawn_server().await;
  let transport = HttpTransport::new(&base).unwrap();
  let err = transport.fetch("/nowhere").await.unwrap_err();
  assert!(matches!(err, ApiError::Status { status: 404, .. }));
}
