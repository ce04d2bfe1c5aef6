use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::RollError;

/// Most rolls a single die spec may ask for.
pub const MAX_ROLLS_PER_DIE: u32 = 100;

/// Most rolls across all specs of one request.
pub const MAX_ROLLS_PER_REQUEST: u64 = 1000;

/// How roll values are produced: `auto` draws pseudorandom values, `manual`
/// asks a human for the results of physical dice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
  #[default]
  Auto,
  Manual,
}

impl fmt::Display for RollMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RollMode::Auto => f.write_str("auto"),
      RollMode::Manual => f.write_str("manual"),
    }
  }
}

/// One kind of die and how many times to roll it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
  die: u32,
  amount: u32,
}

impl DiceSpec {
  /// Validates raw request integers. A die needs at least two sides and
  /// is rolled between 1 and [`MAX_ROLLS_PER_DIE`] times.
  pub fn new(die: i64, amount: i64) -> Result<Self, RollError> {
    if die < 2 {
      return Err(RollError::validation(format!(
        "Invalid die d{die}: a die needs at least 2 sides"
      )));
    }
    let die = u32::try_from(die).map_err(|_| {
      RollError::validation(format!("Invalid die d{die}: at most {} sides", u32::MAX))
    })?;

    if amount < 1 {
      return Err(RollError::validation(format!(
        "Invalid amount {amount} for d{die}: must be a positive integer"
      )));
    }
    if amount > i64::from(MAX_ROLLS_PER_DIE) {
      return Err(RollError::validation(format!(
        "Invalid amount {amount} for d{die}: at most {MAX_ROLLS_PER_DIE} rolls per die"
      )));
    }
    let amount = amount as u32;

    Ok(Self { die, amount })
  }

  pub fn die(&self) -> u32 {
    self.die
  }

  pub fn amount(&self) -> u32 {
    self.amount
  }

  /// Individual roll slots of this spec, numbered from 1.
  pub fn slots(self) -> impl Iterator<Item = RollSlot> {
    (1..=self.amount).map(move |index| RollSlot {
      die: self.die,
      index,
      of: self.amount,
    })
  }
}

/// A validated roll request. The dice sequence is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRequest {
  dice: Vec<DiceSpec>,
  mode: RollMode,
}

impl RollRequest {
  pub fn new(dice: Vec<DiceSpec>, mode: RollMode) -> Result<Self, RollError> {
    if dice.is_empty() {
      return Err(RollError::validation("No dice specified"));
    }
    let request = Self { dice, mode };
    let total = request.total_rolls();
    if total > MAX_ROLLS_PER_REQUEST {
      return Err(RollError::validation(format!(
        "Too many rolls requested: {total} (at most {MAX_ROLLS_PER_REQUEST} per request)"
      )));
    }
    Ok(request)
  }

  pub fn dice(&self) -> &[DiceSpec] {
    &self.dice
  }

  pub fn mode(&self) -> RollMode {
    self.mode
  }

  /// Flattened roll slots in spec order, then within-spec order.
  pub fn slots(&self) -> Vec<RollSlot> {
    self.dice.iter().flat_map(|spec| spec.slots()).collect()
  }

  pub fn total_rolls(&self) -> u64 {
    self.dice.iter().map(|spec| u64::from(spec.amount)).sum()
  }
}

/// A single value to collect from a human: roll `index` of `of` for a
/// die with `die` sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollSlot {
  pub die: u32,
  pub index: u32,
  pub of: u32,
}

impl RollSlot {
  pub fn label(&self) -> String {
    if self.of > 1 {
      format!("d{} (roll {}/{})", self.die, self.index, self.of)
    } else {
      format!("d{}", self.die)
    }
  }

  pub fn accepts(&self, value: u32) -> bool {
    (1..=self.die).contains(&value)
  }
}

/// Rolled values per spec. Mirrors the request: one entry per `DiceSpec`,
/// each holding exactly `amount` values in `[1, die]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
  rolls: Vec<Vec<u32>>,
}

impl RollOutcome {
  pub(crate) fn new(rolls: Vec<Vec<u32>>) -> Self {
    Self { rolls }
  }

  /// Splits a flat value sequence into per-spec chunks, consuming exactly
  /// `amount` values per spec.
  pub fn from_flat(request: &RollRequest, values: Vec<u32>) -> Result<Self, RollError> {
    let expected = request.total_rolls();
    if values.len() as u64 != expected {
      return Err(RollError::unexpected(format!(
        "Expected {expected} roll values but received {}",
        values.len()
      )));
    }

    let mut values = values.into_iter();
    let mut rolls = Vec::with_capacity(request.dice().len());
    for spec in request.dice() {
      let chunk: Vec<u32> = values.by_ref().take(spec.amount() as usize).collect();
      if let Some(bad) = chunk.iter().find(|v| !(1..=spec.die()).contains(*v)) {
        return Err(RollError::unexpected(format!(
          "Roll value {bad} is out of range for d{}",
          spec.die()
        )));
      }
      rolls.push(chunk);
    }

    Ok(Self { rolls })
  }

  pub fn rolls(&self) -> &[Vec<u32>] {
    &self.rolls
  }
}
