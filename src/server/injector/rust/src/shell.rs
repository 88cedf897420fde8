/* src/server/injector/rust/src/shell.rs */

use serde_json::Value;

use crate::escape::escape_script_json;
use crate::helpers::escape_html;

/// Placeholder in the page template replaced by the rendered application markup.
pub const APP_HTML_MARKER: &str = "<!--app-html-->";
/// Element id of the JSON script carrying the SSR state.
pub const SSR_DATA_ID: &str = "__SSR_DATA__";
/// Meta tag naming the request id of a failed render.
pub const ERROR_ID_META: &str = "ssr-error-id";
/// Mount point emitted when server rendering failed.
pub const EMPTY_MOUNT: &str = r#"<div id="app"></div>"#;

fn data_script_open() -> String {
  format!(r#"<script id="{SSR_DATA_ID}" type="application/json">"#)
}

pub fn inject_app_html(template: &str, app_html: &str) -> String {
  template.replacen(APP_HTML_MARKER, app_html, 1)
}

/// Set the `lang` attribute of the `<html>` element, replacing any existing one.
pub fn apply_html_lang(html: &str, locale: &str) -> String {
  let locale = locale.trim();
  if locale.is_empty() {
    return html.to_string();
  }
  let Some((start, end)) = find_html_tag(html) else {
    return html.to_string();
  };
  let tag = &html[start..end];
  let value = escape_html(locale);

  let rewritten = match find_lang_attr(tag) {
    Some((value_start, value_end)) => {
      format!("{}{}{}", &tag[..value_start], value, &tag[value_end..])
    }
    None => format!("<html lang=\"{value}\"{}", &tag["<html".len()..]),
  };
  format!("{}{}{}", &html[..start], rewritten, &html[end..])
}

// Byte range of the opening `<html ...>` tag, `>` included.
fn find_html_tag(html: &str) -> Option<(usize, usize)> {
  let mut from = 0;
  while let Some(offset) = html[from..].find("<html") {
    let start = from + offset;
    let after = &html[start + "<html".len()..];
    if after.starts_with(|c: char| c == '>' || c.is_ascii_whitespace()) {
      let close = after.find('>')?;
      return Some((start, start + "<html".len() + close + 1));
    }
    from = start + "<html".len();
  }
  None
}

// Byte range of the value inside `lang="..."`.
fn find_lang_attr(tag: &str) -> Option<(usize, usize)> {
  let mut from = 0;
  while let Some(offset) = tag[from..].find("lang=\"") {
    let at = from + offset;
    let preceded_by_space = tag[..at].ends_with(|c: char| c.is_ascii_whitespace());
    let value_start = at + "lang=\"".len();
    if preceded_by_space {
      let len = tag[value_start..].find('"')?;
      return Some((value_start, value_start + len));
    }
    from = value_start;
  }
  None
}

/// Insert head markup before `</head>`, or at the very top when the template has none.
pub fn inject_head(html: &str, head: &str) -> String {
  if head.trim().is_empty() {
    return html.to_string();
  }
  let mut injection = head.to_string();
  if !injection.ends_with('\n') {
    injection.push('\n');
  }
  match html.find("</head>") {
    Some(pos) => format!("{}{}{}", &html[..pos], injection, &html[pos..]),
    None => format!("{injection}{html}"),
  }
}

/// Embed `state` as a JSON script, before `</head>` when present, else before `</body>`,
/// else at the end. An empty state adds nothing.
pub fn inject_ssr_data(html: &str, state: &Value) -> String {
  let empty = match state {
    Value::Object(map) => map.is_empty(),
    Value::Null => true,
    _ => false,
  };
  if empty {
    return html.to_string();
  }

  let script =
    format!("{}{}</script>", data_script_open(), escape_script_json(&state.to_string()));
  let pos = html.find("</head>").or_else(|| html.rfind("</body>"));
  match pos {
    Some(pos) => format!("{}{}{}", &html[..pos], script, &html[pos..]),
    None => format!("{html}{script}"),
  }
}

/// Read back the state embedded by [`inject_ssr_data`].
pub fn extract_ssr_data(html: &str) -> Option<Value> {
  let open = data_script_open();
  let start = html.find(&open)? + open.len();
  let len = html[start..].find("</script>")?;
  serde_json::from_str(&html[start..start + len]).ok()
}

/// Assemble a successful server render into the page template.
pub fn assemble_page(
  template: &str,
  app_html: &str,
  head: &str,
  locale: &str,
  state: &Value,
) -> String {
  let page = inject_app_html(template, app_html);
  let page = apply_html_lang(&page, locale);
  let page = inject_head(&page, head);
  inject_ssr_data(&page, state)
}

/// Page served when server rendering failed: an empty mount point, the request id in a
/// meta tag, and the SSR state so the client can still boot.
pub fn fallback_page(template: &str, state: &Value, locale: &str, error_id: &str) -> String {
  let page = inject_app_html(template, EMPTY_MOUNT);
  let page = apply_html_lang(&page, locale);
  let page = if error_id.trim().is_empty() {
    page
  } else {
    let meta = format!(r#"<meta name="{ERROR_ID_META}" content="{}">"#, escape_html(error_id));
    inject_head(&page, &meta)
  };
  inject_ssr_data(&page, state)
}
