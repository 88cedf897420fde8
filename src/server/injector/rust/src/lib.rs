/* src/server/injector/rust/src/lib.rs */

mod escape;
mod helpers;
mod shell;
mod slots;

pub use escape::escape_script_json;
pub use helpers::escape_html;
pub use shell::{
  APP_HTML_MARKER, EMPTY_MOUNT, ERROR_ID_META, SSR_DATA_ID, apply_html_lang, assemble_page,
  extract_ssr_data, fallback_page, inject_app_html, inject_head, inject_ssr_data,
};
pub use slots::render_slots;
