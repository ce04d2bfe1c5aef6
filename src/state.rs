use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::Config;
use crate::dice::{RandomRoller, Resolver};
use crate::prompt::{DisabledCollector, ManualInputCollector, TerminalCollector};

#[derive(Clone)]
pub struct ServerState {
  start_time: Instant,
  roller: Arc<Mutex<RandomRoller>>,
  collector: Arc<dyn ManualInputCollector>,
}

impl ServerState {
  pub fn new(config: &Config) -> Self {
    let collector: Arc<dyn ManualInputCollector> = if config.dice.manual_enabled {
      Arc::new(TerminalCollector::new(&config.dice.tty_path))
    } else {
      tracing::info!("Manual rolling disabled by configuration");
      Arc::new(DisabledCollector)
    };
    Self::with_collector(config, collector)
  }

  /// Builds state around a caller-supplied manual input collector.
  pub fn with_collector(config: &Config, collector: Arc<dyn ManualInputCollector>) -> Self {
    let roller = match config.dice.seed {
      Some(seed) => {
        tracing::info!(seed, "Using seeded random roller");
        RandomRoller::from_seed(seed)
      }
      None => RandomRoller::from_entropy(),
    };

    Self {
      start_time: Instant::now(),
      roller: Arc::new(Mutex::new(roller)),
      collector,
    }
  }

  pub fn resolver(&self) -> Resolver {
    Resolver::new(self.roller.clone(), self.collector.clone())
  }

  pub fn uptime(&self) -> std::time::Duration {
    self.start_time.elapsed()
  }
}
