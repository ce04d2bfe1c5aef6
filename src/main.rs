use anyhow::Result;
use dice_roller_mcp::{config::Config, telemetry, Server};

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();

  // Load configuration
  let config = Config::load()?;

  // Initialize telemetry
  let guard = telemetry::init(&config.telemetry)?;

  tracing::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

  // Create and run server
  let server = Server::new(config);
  server.run().await?;

  // The stdin reader and any pending terminal prompt cannot be interrupted;
  // exit without waiting for them.
  drop(guard);
  std::process::exit(0);
}
