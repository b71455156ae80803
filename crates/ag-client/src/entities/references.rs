//! Environment references.

use ag_core::ClientConfig;
use serde::{Deserialize, Serialize};

use super::{env_collection, EntityKind};
use crate::error::ClientResult;

/// Reference to a keystore or truststore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Reference name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type of the referenced resource, e.g. `KeyStore`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Name of the referenced resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refers: Option<String>,
}

/// References of the configured environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct References;

impl EntityKind for References {
    type Record = Reference;

    fn label(&self) -> &'static str {
        "reference"
    }

    fn export_file(&self) -> String {
        "references.json".to_string()
    }

    fn collection_path(&self, config: &ClientConfig) -> ClientResult<String> {
        env_collection(config, "references")
    }

    fn record_name<'a>(&self, record: &'a Reference) -> &'a str {
        &record.name
    }
}
