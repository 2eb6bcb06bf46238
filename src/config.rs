use std::time::Duration;

use anyhow::Result;

use crate::rfc6238::{Algorithm, Totp};

#[derive(Debug, Clone, PartialEq)]
pub enum Secret {
  Raw(String),
  Base32(String),
}

/// Engine and binary settings, read from the environment (and `.env`).
///
/// | variable             | default        |
/// |----------------------|----------------|
/// | `TOTP_SECRET`        |                |
/// | `TOTP_SECRET_BASE32` | (wins if set)  |
/// | `TOTP_DIGITS`        | 6              |
/// | `TOTP_PERIOD`        | 30             |
/// | `TOTP_ALGORITHM`     | SHA1           |
/// | `TOTP_LENIENCY`      | 0              |
/// | `TOTP_MAX_LENIENCY`  | 600            |
/// | `TOTP_LISTEN`        | 0.0.0.0:3000   |
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  pub secret: Option<Secret>,
  pub digits: u32,
  pub period: u64,
  pub algorithm: Algorithm,
  pub leniency: Duration,
  pub max_leniency: Duration,
  pub listen: String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      secret: None,
      digits: 6,
      period: 30,
      algorithm: Algorithm::SHA1,
      leniency: Duration::ZERO,
      max_leniency: Duration::from_secs(600),
      listen: "0.0.0.0:3000".to_string(),
    }
  }
}

fn parse<T: std::str::FromStr>(name: &str, value: Option<String>) -> Result<Option<T>>
where
  T::Err: std::fmt::Display,
{
  value
    .map(|v| v.trim().parse::<T>().map_err(|e| anyhow::format_err!("{}={:?}: {}", name, v, e)))
    .transpose()
}

impl Settings {
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
    let default = Self::default();
    let secret = match (lookup("TOTP_SECRET_BASE32"), lookup("TOTP_SECRET")) {
      (Some(s), _) => Some(Secret::Base32(s)),
      (None, Some(s)) => Some(Secret::Raw(s)),
      (None, None) => None,
    };
    let settings = Self {
      secret,
      digits: parse("TOTP_DIGITS", lookup("TOTP_DIGITS"))?.unwrap_or(default.digits),
      period: parse("TOTP_PERIOD", lookup("TOTP_PERIOD"))?.unwrap_or(default.period),
      algorithm: parse("TOTP_ALGORITHM", lookup("TOTP_ALGORITHM"))?.unwrap_or(default.algorithm),
      leniency: parse("TOTP_LENIENCY", lookup("TOTP_LENIENCY"))?
        .map(Duration::from_secs)
        .unwrap_or(default.leniency),
      max_leniency: parse("TOTP_MAX_LENIENCY", lookup("TOTP_MAX_LENIENCY"))?
        .map(Duration::from_secs)
        .unwrap_or(default.max_leniency),
      listen: lookup("TOTP_LISTEN").unwrap_or(default.listen),
    };
    debug!("{:?}", settings.redacted());
    Ok(settings)
  }

  fn redacted(&self) -> Self {
    Self {
      secret: self.secret.as_ref().map(|s| match s {
        Secret::Raw(_) => Secret::Raw("***".to_string()),
        Secret::Base32(_) => Secret::Base32("***".to_string()),
      }),
      ..self.clone()
    }
  }

  /// Rejects leniency above `max_leniency`, each window instant costs one HMAC.
  pub fn check_leniency(&self, leniency: Duration) -> Result<Duration> {
    if leniency > self.max_leniency {
      anyhow::bail!("leniency {}s exceeds maximum {}s", leniency.as_secs(), self.max_leniency.as_secs());
    }
    Ok(leniency)
  }

  pub fn totp(&self) -> Result<Totp> {
    let totp = match &self.secret {
      Some(Secret::Raw(s)) => Totp::new(s, self.digits, self.period, self.algorithm)?,
      Some(Secret::Base32(s)) => Totp::from_base32(s, self.digits, self.period, self.algorithm)?,
      None => anyhow::bail!("no secret configured, set TOTP_SECRET or TOTP_SECRET_BASE32"),
    };
    Ok(totp)
  }
}
