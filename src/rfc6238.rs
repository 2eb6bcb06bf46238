use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{digest::KeyInit, Hmac, Mac};
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::sequence::sequence;

type HmacFn = fn(&[u8], &[u8]) -> Vec<u8>;

pub fn base32_encode(secret: &[u8]) -> String {
  base32::encode(base32::Alphabet::RFC4648 { padding: true }, secret)
}

/// Strict padded RFC 4648 decoding: bad length, misplaced `=` or lowercase
/// input is an error, never a shorter key.
pub fn base32_decode(secret: &str) -> Result<Vec<u8>> {
  data_encoding::BASE32.decode(secret.as_bytes()).map_err(|e| {
    debug!("base32_decode: {}", e);
    Error::Decode
  })
}

/// Whole seconds since the epoch, floored, negative before it.
pub fn unix_seconds(t: SystemTime) -> i64 {
  match t.duration_since(UNIX_EPOCH) {
    Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
    Err(e) => {
      let d = e.duration();
      let secs = i64::try_from(d.as_secs()).unwrap_or(i64::MAX);
      -secs - i64::from(d.subsec_nanos() > 0)
    }
  }
}

fn hmac_digest<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Vec<u8> {
  let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
  mac.update(message);
  mac.finalize().into_bytes().to_vec()
}

/// Dynamic truncation of RFC 4226 section 5.3.
fn truncate(digest: &[u8], digits: u32) -> String {
  let offset = (digest[digest.len() - 1] & 0x0f) as usize;
  let code = ((digest[offset] as u32 & 0x7f) << 24) |
        ((digest[offset + 1] as u32 & 0xff) << 16) |
        ((digest[offset + 2] as u32 & 0xff) << 8) |
        (digest[offset + 3] as u32 & 0xff);

  let code = code % 10u32.pow(digits);
  format!("{:0width$}", code, width = digits as usize)
}

/// Hash function keyed by the shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
  #[default]
  SHA1,
  SHA256,
  SHA512,
}

impl Algorithm {
  pub fn name(self) -> &'static str {
    match self {
      Self::SHA1 => "SHA1",
      Self::SHA256 => "SHA256",
      Self::SHA512 => "SHA512",
    }
  }

  fn hmac_fn(self) -> HmacFn {
    match self {
      Self::SHA1 => hmac_digest::<Hmac<sha1::Sha1>>,
      Self::SHA256 => hmac_digest::<Hmac<sha2::Sha256>>,
      Self::SHA512 => hmac_digest::<Hmac<sha2::Sha512>>,
    }
  }
}

impl fmt::Display for Algorithm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Algorithm {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_uppercase().replace('-', "").as_str() {
      "SHA1" => Ok(Self::SHA1),
      "SHA256" => Ok(Self::SHA256),
      "SHA512" => Ok(Self::SHA512),
      _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
    }
  }
}

/// Immutable TOTP configuration.
///
/// The secret is kept base-32 encoded and decoded on every derivation. The
/// HMAC function is picked once, when the configuration is built.
#[derive(Clone)]
pub struct Totp {
  secret: String,
  digits: u32,
  period: u64,
  algorithm: Algorithm,
  hmac: HmacFn,
}

impl fmt::Debug for Totp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Totp")
      .field("secret", &"<redacted>")
      .field("digits", &self.digits)
      .field("period", &self.period)
      .field("algorithm", &self.algorithm)
      .finish()
  }
}

impl Totp {
  /// Builds a configuration from a raw secret.
  pub fn new<S: AsRef<[u8]>>(secret: S, digits: u32, period: u64, algorithm: Algorithm) -> Result<Self> {
    Self::from_base32(&base32_encode(secret.as_ref()), digits, period, algorithm)
  }

  /// Builds a configuration from an already encoded secret. The text is kept
  /// verbatim, a malformed secret only fails once a code is derived.
  pub fn from_base32(secret: &str, digits: u32, period: u64, algorithm: Algorithm) -> Result<Self> {
    if !(1..=9).contains(&digits) {
      return Err(Error::InvalidDigits(digits));
    }
    if period == 0 || i64::try_from(period).is_err() {
      return Err(Error::InvalidPeriod);
    }
    Ok(Self {
      secret: secret.to_string(),
      digits,
      period,
      algorithm,
      hmac: algorithm.hmac_fn(),
    })
  }

  pub fn secret(&self) -> &str { &self.secret }
  pub fn digits(&self) -> u32 { self.digits }
  pub fn period(&self) -> u64 { self.period }
  pub fn algorithm(&self) -> Algorithm { self.algorithm }
  pub fn step(&self) -> Duration { Duration::from_secs(self.period) }

  /// Time-step index of `t`, floor(unix seconds / period).
  pub fn counter(&self, t: SystemTime) -> i64 {
    // period fits in i64, checked on construction
    unix_seconds(t).div_euclid(self.period as i64)
  }

  /// Seconds left before the code valid at `t` rolls over, in `1..=period`.
  pub fn seconds_remaining(&self, t: SystemTime) -> u64 {
    self.period - unix_seconds(t).rem_euclid(self.period as i64) as u64
  }

  /// Code for the time step containing `t`.
  pub fn create(&self, t: SystemTime) -> Result<String> {
    self.generate(self.counter(t))
  }

  pub fn create_now(&self) -> Result<String> {
    self.create(SystemTime::now())
  }

  /// Instants checked by [`Totp::validate`], one period apart over
  /// `[t - leniency, t + leniency]`.
  pub fn window(&self, t: SystemTime, leniency: Duration) -> Vec<SystemTime> {
    let start = t.checked_sub(leniency).unwrap_or(t);
    let end = t.checked_add(leniency).unwrap_or(t);
    sequence(start, end, self.step())
  }

  /// Checks `code` against every instant of the window around `t`.
  ///
  /// Derivation failures count as a mismatch for that instant, so a broken
  /// secret makes every code invalid instead of raising. Comparison runs in
  /// constant time.
  pub fn validate(&self, code: &str, t: SystemTime, leniency: Duration) -> bool {
    self.window(t, leniency).into_iter().any(|i| match self.create(i) {
      Ok(expected) => {
        debug!("validate: checking counter {}", self.counter(i));
        expected.as_bytes().ct_eq(code.as_bytes()).into()
      }
      Err(e) => {
        warn!("validate: counter {} skipped: {}", self.counter(i), e);
        false
      }
    })
  }

  pub fn validate_now(&self, code: &str, leniency: Duration) -> bool {
    self.validate(code, SystemTime::now(), leniency)
  }

  /// HOTP value for `counter`, RFC 4226.
  pub fn generate(&self, counter: i64) -> Result<String> {
    let counter = u64::try_from(counter).map_err(|_| Error::InvalidInput(counter))?;
    let key = base32_decode(&self.secret)?;
    let digest = (self.hmac)(&key, &counter.to_be_bytes());
    Ok(truncate(&digest, self.digits))
  }
}
