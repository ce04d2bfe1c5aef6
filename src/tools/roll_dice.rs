use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use rmcp::model::{CallToolResult, Content};
use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dice::{report, DiceSpec, Resolver, RollMode, RollRequest};
use crate::error::RollError;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[schemars(transform = require_dice)]
pub struct RollDiceRequest {
  /// Array of dice to roll
  #[serde(default)]
  pub dice: Vec<DiceArg>,
  /// Rolling mode: manual for user input via a prompt, auto for system-generated random rolls
  #[serde(default)]
  pub mode: RollMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiceArg {
  /// Type of die (e.g. 6, 8, 12, 20)
  pub die: i64,
  /// Number of times to roll this die (default: 1)
  #[serde(default = "default_amount")]
  pub amount: i64,
}

fn default_amount() -> i64 {
  1
}

/// `dice` deserializes leniently (missing means empty) but is still
/// advertised as required.
fn require_dice(schema: &mut Schema) {
  let object = schema.ensure_object();
  let required = object
    .entry("required")
    .or_insert_with(|| Value::Array(Vec::new()));
  if let Some(list) = required.as_array_mut() {
    if !list.iter().any(|name| name == "dice") {
      list.insert(0, Value::from("dice"));
    }
  }
}

impl DiceArg {
  pub fn new(die: i64, amount: i64) -> Self {
    Self { die, amount }
  }
}

impl RollDiceRequest {
  pub fn into_roll_request(self) -> Result<RollRequest, RollError> {
    let dice = self
      .dice
      .into_iter()
      .map(|arg| DiceSpec::new(arg.die, arg.amount))
      .collect::<Result<Vec<_>, _>>()?;
    RollRequest::new(dice, self.mode)
  }
}

/// The `roll_dice` tool. Every failure becomes a text result; nothing is
/// surfaced as a protocol error.
#[derive(Clone)]
pub struct RollDiceTool {
  resolver: Resolver,
}

impl RollDiceTool {
  pub fn new(resolver: Resolver) -> Self {
    Self { resolver }
  }

  pub async fn roll(&self, req: RollDiceRequest) -> CallToolResult {
    tracing::info!(mode = %req.mode, specs = req.dice.len(), "🎲 roll_dice called");

    let text = match AssertUnwindSafe(self.execute(req)).catch_unwind().await {
      Ok(Ok(report)) => {
        tracing::info!("✅ Dice rolled");
        report
      }
      Ok(Err(e)) => {
        match &e {
          RollError::Unexpected(_) => tracing::error!("❌ Roll failed: {}", e),
          _ => tracing::warn!("Roll rejected: {}", e),
        }
        e.response_text()
      }
      Err(panic) => {
        let message = panic_message(panic.as_ref());
        tracing::error!("❌ Roll panicked: {}", message);
        RollError::unexpected(message).response_text()
      }
    };

    CallToolResult::success(vec![Content::text(text)])
  }

  async fn execute(&self, req: RollDiceRequest) -> Result<String, RollError> {
    let request = req.into_roll_request()?;
    let outcome = self.resolver.resolve(&request).await?;
    Ok(report::render(&request, &outcome))
  }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  if let Some(message) = panic.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = panic.downcast_ref::<String>() {
    message.clone()
  } else {
    "panic while rolling dice".to_string()
  }
}
