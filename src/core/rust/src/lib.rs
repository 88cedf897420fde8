/* src/core/rust/src/lib.rs */

pub mod api;
pub mod bridge;
pub mod config;
pub mod errors;
pub mod i18n;
pub mod locale;
pub mod locale_store;
pub mod navigation;
pub mod route;
pub mod session;
pub mod ssr;
pub mod store;
pub mod tree;

// Re-exports for ergonomic use
pub use api::{ApiResponse, AuthApi, BoxFuture, SsrDataSource, parse_envelope};
pub use config::{VesselConfig, load_config, parse_config};
pub use errors::{ApiError, ConfigError, NavigationError, SessionError, VesselError};
pub use i18n::{Catalogs, I18n, load_catalogs};
pub use locale::{Locale, LocaleSet, path_suffix};
pub use locale_store::{LocaleState, LocaleStore};
pub use navigation::{NavigationOutcome, NavigationStage, Router, Side, StageOutcome, Transition};
pub use route::{Location, ParamValue, RouteMatch, RouteTable};
pub use session::{
  AuthProvider, AuthState, AuthStatus, AuthUser, GoogleLogin, SessionMessage, SessionRecord,
  SessionStore,
};
pub use ssr::{SsrContext, SsrState};
pub use store::{StateTree, StoreState};
pub use tree::{RenderTree, RenderTreeOptions};
