//! # ag-client
//!
//! HTTP client for the API management platform.
//!
//! - [`transport`]: the [`Transport`] trait and the `reqwest` based [`ApiClient`]
//! - [`entities`]: supported entity kinds behind the [`EntityKind`] trait
//! - [`source`]: collection listings and import files
//! - [`transfer`]: bounded-concurrency export and import
//! - [`ops`]: single-entity get and delete

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entities;
pub mod error;
pub mod ops;
pub mod source;
pub mod transfer;
pub mod transport;

pub use entities::{EntityKind, Listing};
pub use error::{ClientError, ClientResult};
pub use ops::{delete_entity, get_entity};
pub use source::{fetch_membership, list_names, read_records};
pub use transfer::{
    export, import, import_file, plan_import, write_export_file, ExportReport, ImportJob,
    ImportOutcome, ImportReport, ImportStatus, ImportSummary,
};
pub use transport::{ApiClient, ApiRequest, Transport};
