pub mod report;
pub mod resolver;
pub mod roller;
pub mod spec;

pub use resolver::Resolver;
pub use roller::RandomRoller;
pub use spec::{
  DiceSpec, RollMode, RollOutcome, RollRequest, RollSlot, MAX_ROLLS_PER_DIE, MAX_ROLLS_PER_REQUEST,
};
