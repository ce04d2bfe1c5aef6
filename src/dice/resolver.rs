use std::sync::{Arc, Mutex};

use super::{RandomRoller, RollMode, RollOutcome, RollRequest};
use crate::error::RollError;
use crate::prompt::{ManualInputCollector, ManualOutcome};

/// Turns a validated request into rolled values, by generator or by human.
#[derive(Clone)]
pub struct Resolver {
  roller: Arc<Mutex<RandomRoller>>,
  collector: Arc<dyn ManualInputCollector>,
}

impl Resolver {
  pub fn new(roller: Arc<Mutex<RandomRoller>>, collector: Arc<dyn ManualInputCollector>) -> Self {
    Self { roller, collector }
  }

  pub async fn resolve(&self, request: &RollRequest) -> Result<RollOutcome, RollError> {
    match request.mode() {
      RollMode::Auto => self.roll_auto(request),
      RollMode::Manual => resolve_manual(request, self.collector.as_ref()).await,
    }
  }

  fn roll_auto(&self, request: &RollRequest) -> Result<RollOutcome, RollError> {
    let mut roller = self
      .roller
      .lock()
      .map_err(|_| RollError::unexpected("Random generator is unavailable"))?;
    Ok(resolve_auto(request, &mut roller))
  }
}

/// Draws `amount` independent values per spec, in spec order.
pub fn resolve_auto(request: &RollRequest, roller: &mut RandomRoller) -> RollOutcome {
  let rolls = request
    .dice()
    .iter()
    .map(|spec| (0..spec.amount()).map(|_| roller.roll(spec.die())).collect())
    .collect();
  RollOutcome::new(rolls)
}

/// Asks the collector once for every slot, then chunks the answers per spec.
/// Cancellation aborts the whole resolution.
pub async fn resolve_manual(
  request: &RollRequest,
  collector: &dyn ManualInputCollector,
) -> Result<RollOutcome, RollError> {
  match collector.collect(&request.slots()).await? {
    ManualOutcome::Values(values) => RollOutcome::from_flat(request, values),
    ManualOutcome::Cancelled => Err(RollError::Cancelled),
  }
}
