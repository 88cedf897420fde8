/* src/server/injector/rust/src/escape.rs */

/// Make serialized JSON safe to place inside a `<script>` element.
///
/// `<`, `>` and `&` become `\u003c`, `\u003e`, `\u0026` so no `</script>` or comment
/// opener can appear, and non-ASCII characters become `\uXXXX` escapes (surrogate pairs
/// above the BMP). The result parses to the same value.
pub fn escape_script_json(json: &str) -> String {
  let mut out = String::with_capacity(json.len());
  for ch in json.chars() {
    match ch {
      '<' => out.push_str("\\u003c"),
      '>' => out.push_str("\\u003e"),
      '&' => out.push_str("\\u0026"),
      c if (c as u32) > 0x7F => push_unicode_escape(&mut out, c as u32),
      c => out.push(c),
    }
  }
  out
}

fn push_unicode_escape(out: &mut String, code: u32) {
  if code > 0xFFFF {
    let adjusted = code - 0x1_0000;
    let hi = (adjusted >> 10) + 0xD800;
    let lo = (adjusted & 0x3FF) + 0xDC00;
    out.push_str(&format!("\\u{hi:04x}\\u{lo:04x}"));
  } else {
    out.push_str(&format!("\\u{code:04x}"));
  }
}
