/// Failures of code derivation and engine construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  /// The stored secret is not valid base-32.
  #[error("unable to decode secret")]
  Decode,
  /// Counters are never negative for instants after the epoch.
  #[error("invalid input: negative counter {0}")]
  InvalidInput(i64),
  #[error("unsupported digit count {0}, expected 1..=9")]
  InvalidDigits(u32),
  #[error("period must be at least one second")]
  InvalidPeriod,
  #[error("unsupported algorithm {0:?}")]
  UnsupportedAlgorithm(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
