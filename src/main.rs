use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use stockroom::{app, config, logging};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(about = "A terminal dashboard for a warehouse-management backend")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/stockroom/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Resource to open first (warehouses, rooms, racks, equipment, products,
  /// inbound, outbound, users)
  #[arg(short, long, default_value = "warehouses")]
  resource: String,

  /// Backend base URL, overriding the config file
  #[arg(long)]
  api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let config = config::Config::load(args.config.as_deref(), args.api_url)?;

  let _log_guard = logging::init(&config.log)?;
  info!(api = %config.api.url, resource = %args.resource, "starting stockroom");

  let mut app = app::App::new(config, &args.resource)?;
  app.run().await?;

  Ok(())
}
