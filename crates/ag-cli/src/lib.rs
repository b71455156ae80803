//! # ag-cli
//!
//! Command-line client for the Apigee management API.
//!
//! Every entity kind (target servers, references, keystores, API products,
//! developers, developer apps, environment groups, key value map entries)
//! supports:
//! - `list`, `get` and `delete` of single entities
//! - `export` of the whole collection to a JSON file
//! - `import` from a JSON file, creating or updating each entity
//!
//! Export and import run with a bounded number of parallel connections
//! (`--conn`, default 4).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
