/* src/server/adapter/axum/src/lib.rs */

pub mod cookie;
pub mod data;
pub mod entry;
mod error;
mod handler;
pub mod render;
pub mod server;

pub use data::{DataHandler, PageDataRegistry, PageRequest, data_handler};
pub use entry::{RenderOutcome, ServerEntry};
pub use render::{RenderOutput, Renderer, TemplateRenderer};
pub use server::{VesselParts, VesselServer};

/// Re-export vessel-core for convenience
pub use vessel_core;

use vessel_core::ConfigError;

/// Extension trait that converts a `VesselServer` into an Axum router.
pub trait IntoAxumRouter {
  fn into_axum_router(self) -> Result<axum::Router, ConfigError>;
  fn serve(
    self,
    addr: &str,
  ) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error>>> + Send;
}

impl IntoAxumRouter for VesselServer {
  fn into_axum_router(self) -> Result<axum::Router, ConfigError> {
    Ok(handler::build_router(self.into_parts()?))
  }

  async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = self.into_axum_router()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
      addr = %local_addr,
      "vessel server listening on http://localhost:{}",
      local_addr.port()
    );
    axum::serve(listener, router).await?;
    Ok(())
  }
}
