/* demo/backend/rust/src/main.rs */

mod pages;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vessel_server_axum::vessel_core::{VesselConfig, load_config};
use vessel_server_axum::{IntoAxumRouter, TemplateRenderer, VesselServer};

#[derive(Parser)]
#[command(name = "vessel-demo", about = "Server-rendered greeting pages in two locales")]
struct Cli {
  /// Config file; `VESSEL_CONFIG` overrides the default.
  #[arg(long, short)]
  config: Option<PathBuf>,
  /// App fragment rendered into the page template.
  #[arg(long, default_value = "app.html")]
  app: PathBuf,
}

/// `PORT` replaces the port of `server.addr`; `SSR_RENDER_LIMIT` replaces `server.render_limit`.
fn apply_env(config: &mut VesselConfig) -> anyhow::Result<()> {
  if let Some(port) = std::env::var("PORT").ok().filter(|p| !p.trim().is_empty()) {
    let port: u16 = port.trim().parse().with_context(|| format!("invalid PORT {port:?}"))?;
    let host = config.server.addr.rsplit_once(':').map_or("0.0.0.0", |(host, _)| host);
    config.server.addr = format!("{host}:{port}");
  }
  if let Some(limit) = std::env::var("SSR_RENDER_LIMIT").ok().filter(|l| !l.trim().is_empty()) {
    let limit: usize =
      limit.trim().parse().with_context(|| format!("invalid SSR_RENDER_LIMIT {limit:?}"))?;
    config.server.render_limit = Some(limit);
  }
  Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();
  let config_path = cli
    .config
    .or_else(|| std::env::var_os("VESSEL_CONFIG").map(PathBuf::from))
    .unwrap_or_else(|| PathBuf::from("vessel.toml"));
  let mut config = load_config(&config_path)?;
  apply_env(&mut config)?;
  let base = config_path.parent().unwrap_or(Path::new("."));

  tracing::info!(
    config = %config_path.display(),
    locales = ?config.i18n.locales,
    render_timeout_ms = config.server.render_timeout_ms,
    render_limit = ?config.server.render_limit,
    "configuration loaded"
  );

  let renderer = TemplateRenderer::from_file(&base.join(&cli.app))?
    .with_head("<title><!--vessel:t.title--></title>");
  let server = pages::register(VesselServer::from_config(&config, base)?.renderer(renderer))?;
  server.serve(&config.server.addr).await.map_err(|e| anyhow::anyhow!("{e}"))
}
