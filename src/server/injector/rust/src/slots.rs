/* src/server/injector/rust/src/slots.rs */

use serde_json::Value;

use crate::helpers::{escape_html, resolve, stringify};

const SLOT_OPEN: &str = "<!--vessel:";
const SLOT_CLOSE: &str = "-->";
const RAW_SUFFIX: &str = ":html";

/// Fill `<!--vessel:dotted.path-->` slots from `data`.
///
/// Values are HTML-escaped; `<!--vessel:path:html-->` inserts them verbatim. Missing
/// paths render as nothing. An unterminated slot is left as-is.
pub fn render_slots(template: &str, data: &Value) -> String {
  let mut out = String::with_capacity(template.len());
  let mut rest = template;

  while let Some(open) = rest.find(SLOT_OPEN) {
    let body_start = open + SLOT_OPEN.len();
    let Some(close) = rest[body_start..].find(SLOT_CLOSE) else {
      break;
    };
    out.push_str(&rest[..open]);

    let body = rest[body_start..body_start + close].trim();
    let (path, raw) = match body.strip_suffix(RAW_SUFFIX) {
      Some(path) => (path, true),
      None => (body, false),
    };
    let text = stringify(resolve(path, data).unwrap_or(&Value::Null));
    if raw {
      out.push_str(&text);
    } else {
      out.push_str(&escape_html(&text));
    }

    rest = &rest[body_start + close + SLOT_CLOSE.len()..];
  }

  out.push_str(rest);
  out
}
