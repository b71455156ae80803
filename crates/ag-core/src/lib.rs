//! # ag-core
//!
//! Core types for apigee-rs: runtime configuration, setup errors, and the
//! bounded-concurrency batch engine used by every export and import.
//!
//! This crate performs no I/O of its own. Remote operations are injected into
//! [`batch::run_batch`] as closures by `ag-client`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod config;
pub mod error;
pub mod membership;

pub use batch::{run_batch, BatchError, BatchOutcome};
pub use config::{ClientConfig, Concurrency, ConflictPolicy, ExistingPolicy};
pub use error::{Error, Result};
pub use membership::{MembershipSet, UpsertAction};
