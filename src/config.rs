use serde::Deserialize;
use config::{Config as ConfigBuilder, ConfigError, File};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ServerError;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
  pub server: ServerConfig,
  pub telemetry: TelemetryConfig,
  #[serde(default)]
  pub dice: DiceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub name: String,
  pub transport: TransportType,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
  Stdio,
  #[serde(rename = "http-streaming")]
  HttpStreaming { port: u16 },
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
  pub level: String,
  pub format: LogFormat,
  pub file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiceConfig {
  /// Fixed seed for the random roller. Entropy-seeded when absent.
  #[serde(default)]
  pub seed: Option<u64>,
  /// Whether `mode: manual` prompts a human at all.
  #[serde(default = "default_manual_enabled")]
  pub manual_enabled: bool,
  /// Terminal device used for manual prompts.
  #[serde(default = "default_tty_path")]
  pub tty_path: String,
}

fn default_manual_enabled() -> bool {
  true
}

fn default_tty_path() -> String {
  "/dev/tty".to_string()
}

impl Default for DiceConfig {
  fn default() -> Self {
    Self {
      seed: None,
      manual_enabled: default_manual_enabled(),
      tty_path: default_tty_path(),
    }
  }
}

impl Config {
  pub fn load() -> Result<Self, ServerError> {
    // Check for config files
    let config_path = std::env::var("MCP_CONFIG")
      .ok()
      .map(PathBuf::from)
      .or_else(|| {
        ["config.toml", "/config.toml"]
          .into_iter()
          .map(PathBuf::from)
          .find(|path| path.exists())
      });

    if let Some(path) = config_path {
      tracing::info!("Loading config from: {}", path.display());
      return Self::load_from(&path);
    }

    tracing::info!("No config file found, building from environment variables");
    Self::from_env()
  }

  pub fn load_from(path: &Path) -> Result<Self, ServerError> {
    let config = ConfigBuilder::builder()
      .add_source(File::from(path))
      .build()?;
    Ok(config.try_deserialize()?)
  }

  pub fn from_env() -> Result<Self, ServerError> {
    let transport = match std::env::var("MCP_TRANSPORT").as_deref() {
      Ok("http-streaming") | Ok("http") => {
        let port = parse_env("PORT", std::env::var("PORT").ok())?.unwrap_or(3000);
        TransportType::HttpStreaming { port }
      }
      _ => TransportType::Stdio,
    };

    let seed = parse_env("MCP_DICE_SEED", std::env::var("MCP_DICE_SEED").ok())?;

    Ok(Config {
      server: ServerConfig {
        name: std::env::var("MCP_SERVER_NAME").unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string()),
        transport,
      },
      telemetry: TelemetryConfig {
        level: std::env::var("MCP_TELEMETRY_LEVEL").unwrap_or_else(|_| "info".to_string()),
        format: match std::env::var("MCP_TELEMETRY_FORMAT").as_deref() {
          Ok("json") => LogFormat::Json,
          _ => LogFormat::Pretty,
        },
        file: std::env::var("MCP_LOG_FILE").ok(),
      },
      dice: DiceConfig {
        seed,
        manual_enabled: !matches!(
          std::env::var("MCP_MANUAL_ENABLED").as_deref(),
          Ok("false") | Ok("0") | Ok("no")
        ),
        tty_path: std::env::var("MCP_TTY_PATH").unwrap_or_else(|_| default_tty_path()),
      },
    })
  }
}

/// Parses an optional environment value; a present but malformed value is
/// a configuration error rather than a silent default.
fn parse_env<T>(name: &str, raw: Option<String>) -> Result<Option<T>, ServerError>
where
  T: FromStr,
  T::Err: Display,
{
  raw
    .map(|value| {
      value.trim().parse::<T>().map_err(|e| {
        ServerError::Config(ConfigError::Message(format!("{name}={value:?} is invalid: {e}")))
      })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
      file,
      r#"
[server]
name = "dice-test"
transport = "stdio"

[telemetry]
level = "debug"
format = "json"

[dice]
seed = 42
manual_enabled = false
"#
    )
    .unwrap();

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.server.name, "dice-test");
    assert_eq!(config.server.transport, TransportType::Stdio);
    assert_eq!(config.telemetry.format, LogFormat::Json);
    assert_eq!(config.dice.seed, Some(42));
    assert!(!config.dice.manual_enabled);
    assert_eq!(config.dice.tty_path, "/dev/tty");
  }

  #[test]
  fn test_dice_section_optional() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
      file,
      r#"
[server]
name = "dice-test"
transport = "stdio"

[telemetry]
level = "info"
format = "pretty"
"#
    )
    .unwrap();

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.dice.seed, None);
    assert!(config.dice.manual_enabled);
  }

  #[test]
  fn test_parse_env_rejects_malformed_values() {
    assert_eq!(parse_env::<u16>("PORT", None).unwrap(), None);
    assert_eq!(parse_env::<u16>("PORT", Some("8080".to_string())).unwrap(), Some(8080));

    let err = parse_env::<u16>("PORT", Some("eighty".to_string())).unwrap_err();
    assert!(matches!(&err, ServerError::Config(_)));
    assert!(err.to_string().contains("PORT=\"eighty\" is invalid"), "{err}");
    assert!(parse_env::<u16>("PORT", Some("70000".to_string())).is_err());

    assert!(parse_env::<u64>("MCP_DICE_SEED", Some("-1".to_string())).is_err());
    assert_eq!(parse_env::<u64>("MCP_DICE_SEED", Some("42".to_string())).unwrap(), Some(42));
  }

  #[test]
  fn test_missing_file_is_config_error() {
    let result = Config::load_from(Path::new("/nonexistent/dice-roller.toml"));
    assert!(matches!(result, Err(ServerError::Config(_))));
  }
}
