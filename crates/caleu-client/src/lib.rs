//! caleu command-line interface.
//!
//! Configuration loading, secret references, and the `run`, `fetch` and
//! `config` subcommands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;
pub mod summary;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
