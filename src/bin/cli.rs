#[macro_use]
extern crate log;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::{Parser, Subcommand};
use totp56::{config::{Secret, Settings}, rfc6238::unix_seconds, Algorithm, Totp};

#[derive(Debug, Subcommand)]
enum Commands {
  /// Print the code for a time (default: now)
  Code {
    #[arg(long, help = "unix seconds")]
    at: Option<u64>,
  },
  /// Check a code, exits with status 1 when it does not match
  #[command(arg_required_else_help = true)]
  Validate {
    code: String,
    #[arg(long, help = "unix seconds")]
    at: Option<u64>,
    #[arg(long, help = "seconds of clock skew accepted on either side")]
    leniency: Option<u64>,
  },
  /// Print the otpauth:// provisioning URI
  #[command(arg_required_else_help = true)]
  Uri {
    label: String,
    #[arg(long, default_value = "")]
    issuer: String,
  },
  /// Show every instant, counter and code of a validation window
  Window {
    #[arg(long, help = "unix seconds")]
    at: Option<u64>,
    #[arg(long, help = "seconds of clock skew accepted on either side")]
    leniency: Option<u64>,
  },
}

#[derive(Debug, Parser)]
struct Cli {
  #[arg(long, help = "raw secret, overrides TOTP_SECRET")]
  secret: Option<String>,
  #[arg(long, help = "treat --secret as base-32 text")]
  base32: bool,
  #[arg(long)]
  digits: Option<u32>,
  #[arg(long)]
  period: Option<u64>,
  #[arg(long, help = "possible values: SHA1, SHA256, SHA512")]
  algorithm: Option<Algorithm>,
  #[command(subcommand)]
  command: Commands,
}

impl Cli {
  fn settings(&self) -> Result<Settings> {
    let mut settings = Settings::from_env()?;
    if let Some(secret) = &self.secret {
      settings.secret = Some(if self.base32 { Secret::Base32(secret.clone()) } else { Secret::Raw(secret.clone()) });
    }
    settings.digits = self.digits.unwrap_or(settings.digits);
    settings.period = self.period.unwrap_or(settings.period);
    settings.algorithm = self.algorithm.unwrap_or(settings.algorithm);
    Ok(settings)
  }
}

fn time(at: Option<u64>) -> SystemTime {
  at.map(|secs| UNIX_EPOCH + Duration::from_secs(secs)).unwrap_or_else(SystemTime::now)
}

fn leniency(settings: &Settings, leniency: Option<u64>) -> Result<Duration> {
  settings.check_leniency(leniency.map(Duration::from_secs).unwrap_or(settings.leniency))
}

#[derive(Debug, tabled::Tabled)]
struct WindowRowView {
  time: i64,
  counter: i64,
  code: String,
}

fn window(totp: &Totp, t: SystemTime, leniency: Duration) -> Vec<WindowRowView> {
  totp.window(t, leniency).into_iter().map(|i| WindowRowView {
    time: unix_seconds(i),
    counter: totp.counter(i),
    code: totp.create(i).unwrap_or_else(|e| format!("<{}>", e)),
  }).collect()
}

fn main() -> Result<()> {
  flexi_logger::Logger::try_with_env_or_str("info")?.start().ok();
  let args = Cli::parse();
  debug!("{:?}", args.command);
  let settings = args.settings()?;
  let totp = settings.totp()?;
  info!("{:?}", totp);
  match args.command {
    Commands::Code { at } => {
      let t = time(at);
      println!("{}", totp.create(t)?);
      info!("valid for {}s", totp.seconds_remaining(t));
    }
    Commands::Validate { code, at, leniency: l } => {
      let l = leniency(&settings, l)?;
      if totp.validate(&code, time(at), l) {
        println!("valid");
      } else {
        println!("invalid");
        std::process::exit(1);
      }
    }
    Commands::Uri { label, issuer } => {
      println!("{}", totp.uri(&label, &issuer));
    }
    Commands::Window { at, leniency: l } => {
      let l = leniency(&settings, l)?;
      println!("{}", tabled::Table::new(window(&totp, time(at), l)));
    }
  }
  Ok(())
}
