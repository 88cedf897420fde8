/* demo/backend/rust/src/pages.rs */

use chrono::Local;
use serde_json::{Value, json};
use vessel_server_axum::vessel_core::{ConfigError, VesselError};
use vessel_server_axum::{PageRequest, VesselServer, data_handler};

fn announcement(locale: &str) -> &'static str {
  match locale {
    "zh-CN" => "欢迎体验 vessel SSR 示例",
    _ => "Welcome to the vessel SSR demo",
  }
}

fn default_name(locale: &str) -> &'static str {
  match locale {
    "zh-CN" => "朋友",
    _ => "friend",
  }
}

fn greeting(locale: &str, name: &str) -> String {
  match locale {
    "zh-CN" => format!("你好，{name}！"),
    _ => format!("Hello, {name}!"),
  }
}

pub async fn home(req: PageRequest) -> Result<Value, VesselError> {
  let locale = req.locale.as_str();
  Ok(json!({
    "announcement": announcement(locale),
    "serverTime": Local::now().to_rfc2822(),
    "locale": locale,
  }))
}

pub async fn hi(req: PageRequest) -> Result<Value, VesselError> {
  let locale = req.locale.as_str();
  let mut name = req.param("name").unwrap_or(default_name(locale)).to_string();
  if let Some(title) = req.query("title").filter(|t| !t.is_empty()) {
    name = format!("{title} {name}");
  }
  Ok(json!({
    "greeting": greeting(locale, &name),
    "generatedAt": Local::now().to_rfc3339(),
    "locale": locale,
  }))
}

/// Register the demo pages.
pub fn register(server: VesselServer) -> Result<VesselServer, ConfigError> {
  server.page_data("/", data_handler(home))?.page_data("/hi/:name", data_handler(hi))
}
