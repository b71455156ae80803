//! Entries of a key value map.
//!
//! A map lives at organization, environment or API proxy level; the scope
//! decides the collection path and the export file name.

use ag_core::ClientConfig;
use serde::{Deserialize, Serialize};

use super::{records_or_envelope, EntityKind, Listing};
use crate::error::ClientResult;

const ENVELOPE: &str = "keyValueEntries";

/// One key value map entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueEntry {
    /// Entry key.
    pub name: String,
    /// Entry value.
    #[serde(default)]
    pub value: String,
}

/// Level a key value map is defined at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvmScope {
    /// Organization-level map.
    Org,
    /// Map of the configured environment.
    Env,
    /// Map owned by an API proxy.
    Proxy(String),
}

/// Entries of one key value map.
#[derive(Debug, Clone)]
pub struct KvmEntries {
    map: String,
    scope: KvmScope,
}

impl KvmEntries {
    /// Creates the entry collection of `map` at `scope`.
    pub fn new(map: impl Into<String>, scope: KvmScope) -> Self {
        Self {
            map: map.into(),
            scope,
        }
    }

    /// Map name.
    pub fn map(&self) -> &str {
        &self.map
    }

    /// Map scope.
    pub fn scope(&self) -> &KvmScope {
        &self.scope
    }
}

impl EntityKind for KvmEntries {
    type Record = KeyValueEntry;

    fn label(&self) -> &'static str {
        "kvm entry"
    }

    fn export_file(&self) -> String {
        let scope = match &self.scope {
            KvmScope::Org => "org".to_string(),
            KvmScope::Env => "env".to_string(),
            KvmScope::Proxy(proxy) => format!("proxy_{proxy}"),
        };
        format!("kvm_{scope}_{}_entries.json", self.map)
    }

    fn collection_path(&self, config: &ClientConfig) -> ClientResult<String> {
        let map = urlencoding::encode(&self.map);
        Ok(match &self.scope {
            KvmScope::Org => format!("keyvaluemaps/{map}/entries"),
            KvmScope::Env => format!(
                "environments/{}/keyvaluemaps/{map}/entries",
                urlencoding::encode(config.require_env()?)
            ),
            KvmScope::Proxy(proxy) => format!(
                "apis/{}/keyvaluemaps/{map}/entries",
                urlencoding::encode(proxy)
            ),
        })
    }

    fn page_token_param(&self) -> &'static str {
        "page_token"
    }

    fn parse_listing(&self, body: &[u8]) -> ClientResult<Listing> {
        Listing::from_envelope(body, ENVELOPE, "name")
    }

    fn parse_records(&self, body: &[u8]) -> ClientResult<Vec<KeyValueEntry>> {
        records_or_envelope(body, ENVELOPE)
    }

    fn record_name<'a>(&self, record: &'a KeyValueEntry) -> &'a str {
        &record.name
    }
}
