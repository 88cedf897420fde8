/* src/client/rust/src/lib.rs */

pub mod entry;
pub mod error;
pub mod preference;
pub mod transport;

pub use entry::{ClientApp, ClientEntry, Mount};
pub use error::ClientError;
pub use preference::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use transport::HttpTransport;
