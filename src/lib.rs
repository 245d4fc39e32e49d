//! Local account registry and submission dispatcher for online judges.
//!
//! A [`Session`] keeps every stored [`Account`](model::Account), remembers
//! which one is current and owns the single [`Adapter`](adapter::Adapter)
//! bound to it. Login, submission and status requests are forwarded to that
//! adapter and resolve later through a [`Pending`](adapter::Pending).

#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use lazy_static::lazy_static;
use semver::Version;

pub mod adapter;
pub mod config;
pub mod model;
pub mod session;

pub use jsub_util::{abs_path, console};

pub use adapter::{AdapterContext, AdapterFactory, AdapterRegistry, Pending};
pub use config::{Config, SessionConfig};
pub use console::Console;
pub use session::{AddOutcome, Session, Snapshot};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

lazy_static! {
    static ref VERSION: Version = Version::parse(env!("CARGO_PKG_VERSION")).unwrap();
}
