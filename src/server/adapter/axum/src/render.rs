/* src/server/adapter/axum/src/render.rs */

use std::path::Path;

use serde_json::Value;
use vessel_core::{BoxFuture, ConfigError, RenderTree, VesselError};
use vessel_injector::render_slots;

/// Markup produced for one request: the app body and extra `<head>` content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
  pub html: String,
  pub head: String,
}

/// Turns a navigated render tree into markup.
pub trait Renderer: Send + Sync {
  fn render<'a>(&'a self, tree: &'a RenderTree) -> BoxFuture<'a, Result<RenderOutput, VesselError>>;
}

/// Fills `<!--vessel:...-->` slots in an app fragment.
///
/// Slots see the SSR state plus `t` (active catalog), `locale` and `route` (current path).
/// A string `head` key in the state overrides the configured head fragment.
pub struct TemplateRenderer {
  app: String,
  head: String,
}

impl TemplateRenderer {
  pub fn new(app: impl Into<String>) -> Self {
    Self { app: app.into(), head: String::new() }
  }

  pub fn with_head(mut self, head: impl Into<String>) -> Self {
    self.head = head.into();
    self
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let app = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    Ok(Self::new(app))
  }

  fn view(tree: &RenderTree) -> Value {
    let mut view = tree.ssr().state();
    view.insert("t".into(), tree.i18n().active_catalog());
    view.insert("locale".into(), Value::String(tree.i18n().active_locale().to_string()));
    if let Some(location) = tree.router().current() {
      view.insert("route".into(), Value::String(location.path));
    }
    Value::Object(view)
  }
}

impl Renderer for TemplateRenderer {
  fn render<'a>(
    &'a self,
    tree: &'a RenderTree,
  ) -> BoxFuture<'a, Result<RenderOutput, VesselError>> {
    Box::pin(async move {
      let view = Self::view(tree);
      let head = match view.get("head").and_then(Value::as_str) {
        Some(head) => head.to_string(),
        None => render_slots(&self.head, &view),
      };
      Ok(RenderOutput { html: render_slots(&self.app, &view), head })
    })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use serde_json::json;
  use vessel_core::{Catalogs, LocaleSet, RenderTreeOptions, RouteTable, Side};

  use super::*;

  fn tree(initial: Value) -> RenderTree {
    let locales = LocaleSet::new(["en", "fr"], "en").unwrap();
    let mut catalogs = Catalogs::new();
    catalogs.insert("fr".into(), json!({"hello": "Bonjour"}).as_object().cloned().unwrap());
    let routes = RouteTable::new().route("/", ()).and_then(RouteTable::with_locale_prefix).unwrap();
    RenderTree::build(RenderTreeOptions {
      initial,
      catalogs: Arc::new(catalogs),
      ..RenderTreeOptions::new(Side::Server, locales, routes)
    })
  }

  #[tokio::test]
  async fn fills_state_catalog_and_route() {
    let tree = tree(json!({"name": "<Ann>"}));
    tree.router().push("/fr").await.unwrap();
    let renderer = TemplateRenderer::new(
      "<p><!--vessel:t.hello--> <!--vessel:name--></p><i><!--vessel:route--></i>",
    )
    .with_head("<title><!--vessel:locale--></title>");
    let out = renderer.render(&tree).await.unwrap();
    assert_eq!(out.html, "<p>Bonjour &lt;Ann&gt;</p><i>/fr</i>");
    assert_eq!(out.head, "<title>fr</title>");
  }

  #[tokio::test]
  async fn head_key_overrides_fragment() {
    let tree = tree(json!({"head": "<meta name=\"x\">"}));
    let out = TemplateRenderer::new("").with_head("<title></title>").render(&tree).await.unwrap();
    assert_eq!(out.head, "<meta name=\"x\">");
  }
}
