pub mod config;
pub mod dice;
pub mod error;
pub mod prompt;
pub mod state;
pub mod telemetry;
pub mod tools;

use std::sync::Arc;

use anyhow::Result;
use rmcp::{
  handler::server::{router::tool::ToolRouter, wrapper::Parameters},
  model::{CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo, Tool},
  tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};

use crate::config::{Config, TransportType};
use crate::error::ServerError;
use crate::prompt::ManualInputCollector;
use crate::state::ServerState;
use crate::tools::roll_dice::{RollDiceRequest, RollDiceTool};

#[derive(Clone)]
pub struct Server {
  config: Config,
  state: ServerState,
  dice: RollDiceTool,
  tool_router: ToolRouter<Self>,
}

impl Server {
  pub fn new(config: Config) -> Self {
    let state = ServerState::new(&config);
    Self::from_state(config, state)
  }

  /// Server whose manual rolls come from `collector` instead of the terminal.
  pub fn with_collector(config: Config, collector: Arc<dyn ManualInputCollector>) -> Self {
    let state = ServerState::with_collector(&config, collector);
    Self::from_state(config, state)
  }

  fn from_state(config: Config, state: ServerState) -> Self {
    let dice = RollDiceTool::new(state.resolver());
    Self {
      config,
      state,
      dice,
      tool_router: Self::tool_router(),
    }
  }

  /// Tools advertised to clients.
  pub fn tools(&self) -> Vec<Tool> {
    self.tool_router.list_all()
  }

  pub async fn run(self) -> Result<()> {
    let names: Vec<String> = self.tools().into_iter().map(|t| t.name.to_string()).collect();
    tracing::info!("Available tools: {}", names.join(", "));

    let state = self.state.clone();
    match self.config.server.transport.clone() {
      TransportType::Stdio => self.run_stdio().await?,
      TransportType::HttpStreaming { port } => self.run_http(port).await?,
    }

    tracing::info!("Server stopped after {}s", state.uptime().as_secs());
    Ok(())
  }

  async fn run_stdio(self) -> Result<()> {
    let service = self
      .serve(rmcp::transport::stdio())
      .await
      .map_err(|e| ServerError::Transport(e.to_string()))?;
    let cancel = service.cancellation_token();

    tokio::select! {
      result = service.waiting() => {
        tracing::info!("Server stopped: {:?}", result);
      }
      _ = shutdown_signal() => {
        tracing::info!("Shutting down gracefully");
        cancel.cancel();
      }
    }

    Ok(())
  }

  async fn run_http(self, port: u16) -> Result<()> {
    use rmcp::transport::streamable_http_server::{
      session::local::LocalSessionManager, StreamableHttpService,
    };

    let service = StreamableHttpService::new(
      move || Ok(self.clone()),
      LocalSessionManager::default().into(),
      Default::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
      .await
      .map_err(ServerError::Io)?;

    tracing::info!("Listening on http://0.0.0.0:{}/mcp", port);
    axum::serve(listener, router)
      .with_graceful_shutdown(shutdown_signal())
      .await
      .map_err(ServerError::Io)?;

    Ok(())
  }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(error) = tokio::signal::ctrl_c().await {
      tracing::warn!(%error, "Failed to listen for Ctrl+C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(error) => {
        tracing::warn!(%error, "Failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("Shutdown signal received");
}

#[tool_router]
impl Server {
  #[tool(
    description = "Roll dice either manually (user inputs results via a prompt) or automatically (system generates random results). Accepts an array of dice specifications."
  )]
  pub async fn roll_dice(
    &self,
    Parameters(req): Parameters<RollDiceRequest>,
  ) -> Result<CallToolResult, McpError> {
    Ok(self.dice.roll(req).await)
  }
}

#[tool_handler]
impl ServerHandler for Server {
  fn get_info(&self) -> ServerInfo {
    ServerInfo {
      protocol_version: ProtocolVersion::LATEST,
      capabilities: ServerCapabilities::builder().enable_tools().build(),
      server_info: Implementation {
        name: self.config.server.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ..Implementation::from_build_env()
      },
      instructions: Some(
        "Dice roller. Call roll_dice with a list of {die, amount} specs. ".to_string()
          + "mode=auto draws random values; mode=manual asks a human to enter "
          + "the results of physical dice.",
      ),
    }
  }
}
