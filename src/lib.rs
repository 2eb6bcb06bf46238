#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod rfc6238;
pub mod sequence;
pub mod uri;

pub use error::{Error, Result};
pub use rfc6238::{Algorithm, Totp};
pub use sequence::sequence;
