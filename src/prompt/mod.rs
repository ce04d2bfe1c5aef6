//! Manual roll collection. The resolver only sees [`ManualInputCollector`];
//! how the human is asked is up to the implementation.

pub mod terminal;

pub use terminal::TerminalCollector;

use async_trait::async_trait;

use crate::dice::RollSlot;
use crate::error::RollError;

/// Result of asking a human for roll values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualOutcome {
  /// One value per slot, in slot order.
  Values(Vec<u32>),
  /// The human aborted. No partial values are kept.
  Cancelled,
}

/// Presents one input per roll slot and waits for the human to answer.
///
/// Implementations must not retain input between calls. Runtime faults are
/// reported as [`RollError::Unexpected`]; cancellation is an outcome, not
/// an error.
#[async_trait]
pub trait ManualInputCollector: Send + Sync + 'static {
  async fn collect(&self, slots: &[RollSlot]) -> Result<ManualOutcome, RollError>;
}

/// Collector used when manual rolling is switched off in configuration.
#[derive(Clone, Debug, Default)]
pub struct DisabledCollector;

#[async_trait]
impl ManualInputCollector for DisabledCollector {
  async fn collect(&self, _slots: &[RollSlot]) -> Result<ManualOutcome, RollError> {
    Err(RollError::unexpected("Manual rolling is disabled on this server"))
  }
}
