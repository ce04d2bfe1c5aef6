use super::{DiceSpec, RollOutcome, RollRequest};

/// Renders the mode tag followed by one line per spec.
pub fn render(request: &RollRequest, outcome: &RollOutcome) -> String {
  let mut lines = Vec::with_capacity(request.dice().len() + 1);
  lines.push(format!("({})", request.mode()));
  lines.extend(
    request
      .dice()
      .iter()
      .zip(outcome.rolls())
      .map(|(spec, rolls)| render_line(spec, rolls)),
  );
  lines.join("\n")
}

fn render_line(spec: &DiceSpec, rolls: &[u32]) -> String {
  match rolls {
    [value] => format!("d{}: {}", spec.die(), value),
    _ => {
      let total: u64 = rolls.iter().copied().map(u64::from).sum();
      let values = rolls
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<String>>()
        .join(", ");
      format!("{}d{}: [{}] (total: {})", spec.amount(), spec.die(), values, total)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dice::RollMode;

  fn request(dice: &[(i64, i64)], mode: RollMode) -> RollRequest {
    let dice = dice
      .iter()
      .map(|&(die, amount)| DiceSpec::new(die, amount).unwrap())
      .collect();
    RollRequest::new(dice, mode).unwrap()
  }

  #[test]
  fn test_multi_roll_line_has_total() {
    let req = request(&[(6, 3)], RollMode::Manual);
    let outcome = RollOutcome::from_flat(&req, vec![2, 4, 6]).unwrap();
    assert_eq!(render(&req, &outcome), "(manual)\n3d6: [2, 4, 6] (total: 12)");
  }

  #[test]
  fn test_single_roll_line() {
    let req = request(&[(20, 1)], RollMode::Auto);
    let outcome = RollOutcome::new(vec![vec![17]]);
    assert_eq!(render(&req, &outcome), "(auto)\nd20: 17");
  }

  #[test]
  fn test_lines_follow_spec_order() {
    let req = request(&[(4, 1), (6, 2)], RollMode::Manual);
    let outcome = RollOutcome::from_flat(&req, vec![3, 1, 5]).unwrap();
    assert_eq!(render(&req, &outcome), "(manual)\nd4: 3\n2d6: [1, 5] (total: 6)");
  }

  #[test]
  fn test_render_is_idempotent() {
    let req = request(&[(100, 5), (2, 1)], RollMode::Auto);
    let outcome = RollOutcome::new(vec![vec![100, 99, 1, 50, 73], vec![2]]);
    assert_eq!(render(&req, &outcome), render(&req, &outcome));
  }

  #[test]
  fn test_total_does_not_overflow() {
    let req = request(&[(i64::from(u32::MAX), 2)], RollMode::Auto);
    let outcome = RollOutcome::new(vec![vec![u32::MAX, u32::MAX]]);
    let expected = format!(
      "(auto)\n2d{max}: [{max}, {max}] (total: {})",
      u64::from(u32::MAX) * 2,
      max = u32::MAX
    );
    assert_eq!(render(&req, &outcome), expected);
  }
}
