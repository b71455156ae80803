//! Environment keystores.
//!
//! Import files list keystores either by name or as the objects written by
//! export. Keystores cannot be updated in place, so existing ones are skipped
//! on import.

use ag_core::ClientConfig;
use reqwest::Method;
use serde::Deserialize;

use super::{env_collection, EntityKind};
use crate::error::ClientResult;

#[derive(Deserialize)]
#[serde(untagged)]
enum KeystoreRecord {
    Name(String),
    Object { name: String },
}

impl From<KeystoreRecord> for String {
    fn from(record: KeystoreRecord) -> Self {
        match record {
            KeystoreRecord::Name(name) | KeystoreRecord::Object { name } => name,
        }
    }
}

/// Keystores of the configured environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keystores;

impl EntityKind for Keystores {
    type Record = String;

    fn label(&self) -> &'static str {
        "keystore"
    }

    fn export_file(&self) -> String {
        "keystores.json".to_string()
    }

    fn collection_path(&self, config: &ClientConfig) -> ClientResult<String> {
        env_collection(config, "keystores")
    }

    fn parse_records(&self, body: &[u8]) -> ClientResult<Vec<String>> {
        let records: Vec<KeystoreRecord> = serde_json::from_slice(body)?;
        Ok(records.into_iter().map(String::from).collect())
    }

    fn record_name<'a>(&self, record: &'a String) -> &'a str {
        record
    }

    fn update_method(&self) -> Option<Method> {
        None
    }

    fn payload(&self, record: &String) -> ClientResult<Vec<u8>> {
        Ok(serde_json::to_vec(&serde_json::json!({ "name": record }))?)
    }
}
