use std::time::{Duration, SystemTime};

/// Instants from `start` to `end` (inclusive) spaced by `step`.
///
/// Endpoints are swapped when `start` is after `end`. A zero `step` yields
/// only `start`. The caller is responsible for keeping the range bounded.
pub fn sequence(start: SystemTime, end: SystemTime, step: Duration) -> Vec<SystemTime> {
  let (start, end) = if start > end { (end, start) } else { (start, end) };
  if step.is_zero() {
    return vec![start];
  }
  let mut seq = Vec::new();
  let mut t = Some(start);
  while let Some(i) = t.filter(|i| *i <= end) {
    seq.push(i);
    t = i.checked_add(step);
  }
  seq
}

#[cfg(test)]
mod test {
  use super::*;

  const MINUTE: Duration = Duration::from_secs(60);

  #[test]
  fn test_sequence() {
    let now = SystemTime::now();
    let seq = sequence(now - MINUTE, now + MINUTE, MINUTE);
    assert_eq!(seq, vec![now - MINUTE, now, now + MINUTE]);

    assert_eq!(sequence(now, now, Duration::ZERO), vec![now]);
  }

  #[test]
  fn test_sequence_swapped() {
    let now = SystemTime::now();
    let a = now + Duration::from_secs(95);
    let b = now - Duration::from_secs(40);
    assert_eq!(sequence(a, b, Duration::from_secs(30)), sequence(b, a, Duration::from_secs(30)));
    assert_eq!(sequence(a, b, Duration::ZERO), vec![b]);
  }

  #[test]
  fn test_sequence_inclusive_end() {
    let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
    let step = Duration::from_secs(30);
    // lands exactly on end
    let seq = sequence(t, t + Duration::from_secs(90), step);
    assert_eq!(seq.len(), 4);
    assert_eq!(seq.last(), Some(&(t + Duration::from_secs(90))));
    // stops before the first instant past end
    let seq = sequence(t, t + Duration::from_secs(89), step);
    assert_eq!(seq, vec![t, t + step, t + step * 2]);
  }

  #[test]
  fn test_sequence_degenerate() {
    let t = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
    assert_eq!(sequence(t, t, Duration::from_secs(30)), vec![t]);
    // a step larger than the range still yields start
    assert_eq!(sequence(t, t + Duration::from_secs(5), Duration::from_secs(30)), vec![t]);
  }
}
