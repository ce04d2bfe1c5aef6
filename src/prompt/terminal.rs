use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use super::{ManualInputCollector, ManualOutcome};
use crate::dice::RollSlot;
use crate::error::RollError;

/// Prompts on the controlling terminal. stdin/stdout carry the MCP stream,
/// so the terminal device is opened directly for each prompt.
#[derive(Clone, Debug)]
pub struct TerminalCollector {
  tty_path: PathBuf,
  in_flight: Arc<Mutex<()>>,
}

impl TerminalCollector {
  pub fn new(tty_path: impl Into<PathBuf>) -> Self {
    Self {
      tty_path: tty_path.into(),
      in_flight: Arc::new(Mutex::new(())),
    }
  }
}

#[async_trait]
impl ManualInputCollector for TerminalCollector {
  async fn collect(&self, slots: &[RollSlot]) -> Result<ManualOutcome, RollError> {
    // Held by the prompt thread until the human answers, even if this
    // future is dropped first.
    let permit = self.in_flight.clone().lock_owned().await;
    let slots = slots.to_vec();
    let tty_path = self.tty_path.clone();
    let (tx, rx) = oneshot::channel();

    tracing::info!(slots = slots.len(), tty = %tty_path.display(), "🎲 Waiting for manual rolls");

    // Detached so a pending prompt never holds up process exit.
    std::thread::Builder::new()
      .name("dice-prompt".to_string())
      .spawn(move || {
        let _permit = permit;
        let _ = tx.send(prompt_on_tty(&tty_path, &slots));
      })
      .map_err(|e| RollError::unexpected(format!("Failed to start prompt thread: {e}")))?;

    let result = rx
      .await
      .map_err(|_| RollError::unexpected("Prompt thread exited without an answer"))?;

    result.map_err(|e| {
      tracing::error!("❌ Terminal prompt failed: {}", e);
      RollError::unexpected(format!("Terminal prompt failed: {e}"))
    })
  }
}

fn prompt_on_tty(path: &Path, slots: &[RollSlot]) -> io::Result<ManualOutcome> {
  let tty = OpenOptions::new().read(true).write(true).open(path)?;
  let mut input = BufReader::new(tty.try_clone()?);
  let mut output = tty;
  prompt_rolls(slots, &mut input, &mut output)
}

/// Runs the roll form over any line-based input/output pair.
///
/// A blank answer takes the default of 1. `c`, `cancel`, `q` or end of input
/// cancel the whole form, as does declining the final confirmation.
pub fn prompt_rolls<R: BufRead, W: Write>(
  slots: &[RollSlot],
  input: &mut R,
  output: &mut W,
) -> io::Result<ManualOutcome> {
  writeln!(output, "🎲 Dice Roller")?;
  writeln!(output, "Enter your dice rolls (blank = 1, 'c' to cancel)")?;
  writeln!(output, "----------------------------------------")?;

  let mut values = Vec::with_capacity(slots.len());
  for slot in slots {
    match read_slot(slot, input, output)? {
      Some(value) => values.push(value),
      None => return cancelled(output),
    }
  }

  writeln!(output, "----------------------------------------")?;
  loop {
    write!(output, "Submit rolls? [Y/n] ")?;
    output.flush()?;
    let Some(line) = read_line(input)? else {
      return cancelled(output);
    };
    match line.to_ascii_lowercase().as_str() {
      "" | "y" | "yes" => return Ok(ManualOutcome::Values(values)),
      "n" | "no" | "c" | "cancel" | "q" => return cancelled(output),
      _ => writeln!(output, "  please answer y or n")?,
    }
  }
}

fn read_slot<R: BufRead, W: Write>(
  slot: &RollSlot,
  input: &mut R,
  output: &mut W,
) -> io::Result<Option<u32>> {
  loop {
    write!(output, "{:<16} > ", slot.label())?;
    output.flush()?;

    let Some(line) = read_line(input)? else {
      return Ok(None);
    };
    match line.to_ascii_lowercase().as_str() {
      "" => return Ok(Some(1)),
      "c" | "cancel" | "q" => return Ok(None),
      answer => match answer.parse::<u32>() {
        Ok(value) if slot.accepts(value) => return Ok(Some(value)),
        _ => writeln!(output, "  enter a whole number between 1 and {}", slot.die)?,
      },
    }
  }
}

/// Next trimmed line, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
  let mut line = String::new();
  if input.read_line(&mut line)? == 0 {
    return Ok(None);
  }
  Ok(Some(line.trim().to_string()))
}

fn cancelled<W: Write>(output: &mut W) -> io::Result<ManualOutcome> {
  writeln!(output)?;
  writeln!(output, "Roll cancelled.")?;
  Ok(ManualOutcome::Cancelled)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  fn slots() -> Vec<RollSlot> {
    vec![
      RollSlot { die: 4, index: 1, of: 1 },
      RollSlot { die: 6, index: 1, of: 2 },
      RollSlot { die: 6, index: 2, of: 2 },
    ]
  }

  fn run(script: &str) -> (ManualOutcome, String) {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut output = Vec::new();
    let outcome = prompt_rolls(&slots(), &mut input, &mut output).unwrap();
    (outcome, String::from_utf8(output).unwrap())
  }

  #[test]
  fn test_collects_values_in_slot_order() {
    let (outcome, transcript) = run("3\n1\n5\ny\n");
    assert_eq!(outcome, ManualOutcome::Values(vec![3, 1, 5]));
    assert!(transcript.contains("d4"));
    assert!(transcript.contains("d6 (roll 1/2)"));
    assert!(transcript.contains("d6 (roll 2/2)"));
  }

  #[test]
  fn test_blank_answers_default_to_one() {
    let (outcome, _) = run("\n\n\n\n");
    assert_eq!(outcome, ManualOutcome::Values(vec![1, 1, 1]));
  }

  #[test]
  fn test_out_of_range_is_reprompted() {
    let (outcome, transcript) = run("9\n0\nfour\n4\n6\n2\nyes\n");
    assert_eq!(outcome, ManualOutcome::Values(vec![4, 6, 2]));
    assert_eq!(transcript.matches("between 1 and 4").count(), 3);
  }

  #[test]
  fn test_cancel_mid_form() {
    let (outcome, transcript) = run("2\nc\n");
    assert_eq!(outcome, ManualOutcome::Cancelled);
    assert!(transcript.contains("Roll cancelled."));
  }

  #[test]
  fn test_declined_confirmation_cancels() {
    let (outcome, _) = run("2\n3\n4\nn\n");
    assert_eq!(outcome, ManualOutcome::Cancelled);
  }

  #[test]
  fn test_end_of_input_cancels() {
    let (outcome, _) = run("2\n3\n");
    assert_eq!(outcome, ManualOutcome::Cancelled);
  }

  #[tokio::test]
  async fn test_missing_terminal_is_unexpected() {
    let collector = TerminalCollector::new("/nonexistent/dice-roller-tty");
    let result = collector.collect(&slots()).await;
    assert!(matches!(result, Err(RollError::Unexpected(msg)) if msg.starts_with("Terminal prompt failed")));
  }
}
