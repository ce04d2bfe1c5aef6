use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
  #[error("Configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("Transport error: {0}")]
  Transport(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
}

/// Failures of a single `roll_dice` invocation. None of these escape the
/// tool boundary; they are rendered into the text response instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RollError {
  /// Malformed or missing dice input. Raised before any roll happens.
  #[error("{0}")]
  Validation(String),

  /// The human aborted a manual prompt. No dice count as rolled.
  #[error("User cancelled the dice roll")]
  Cancelled,

  /// Presentation-layer or runtime fault.
  #[error("{0}")]
  Unexpected(String),
}

impl RollError {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn unexpected(message: impl Into<String>) -> Self {
    Self::Unexpected(message.into())
  }

  /// Text returned to the caller in place of a report.
  pub fn response_text(&self) -> String {
    match self {
      Self::Validation(_) | Self::Cancelled => format!("Error: {self}"),
      Self::Unexpected(_) => format!("Unexpected error: {self}"),
    }
  }
}
