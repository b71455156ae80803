//! Entity kinds supported by batch export and import.
//!
//! The batch callers in [`crate::transfer`] are written once against the
//! [`EntityKind`] trait. A kind only describes where its collection lives,
//! how the platform lists it, how records are named and serialized, and how
//! an existing entity is updated.

use ag_core::ClientConfig;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientResult;

pub mod apps;
pub mod developers;
pub mod envgroups;
pub mod keystores;
pub mod kvm;
pub mod products;
pub mod references;
pub mod targetservers;

pub use apps::{App, Apps};
pub use developers::{Developer, Developers};
pub use envgroups::{EnvGroup, EnvGroups};
pub use keystores::Keystores;
pub use kvm::{KeyValueEntry, KvmEntries, KvmScope};
pub use products::{ApiProduct, Products};
pub use references::{Reference, References};
pub use targetservers::{TargetServer, TargetServers};

/// Description of one remote resource collection.
pub trait EntityKind: Send + Sync {
    /// Typed form of one entity as found in import files.
    type Record: Serialize + DeserializeOwned;

    /// Singular label used in messages, e.g. `targetserver`.
    fn label(&self) -> &'static str;

    /// File name export writes the collection to.
    fn export_file(&self) -> String;

    /// Organization-relative path of the collection.
    fn collection_path(&self, config: &ClientConfig) -> ClientResult<String>;

    /// Organization-relative path of one entity.
    fn entity_path(&self, config: &ClientConfig, name: &str) -> ClientResult<String> {
        Ok(format!(
            "{}/{}",
            self.collection_path(config)?,
            urlencoding::encode(name)
        ))
    }

    /// Path of the listing request for one page.
    fn listing_path(&self, config: &ClientConfig, page_token: Option<&str>) -> ClientResult<String> {
        let collection = self.collection_path(config)?;
        Ok(match page_token {
            Some(token) => format!(
                "{collection}?{}={}",
                self.page_token_param(),
                urlencoding::encode(token)
            ),
            None => collection,
        })
    }

    /// Query parameter carrying the page token.
    fn page_token_param(&self) -> &'static str {
        "pageToken"
    }

    /// Parses one page of the collection listing.
    fn parse_listing(&self, body: &[u8]) -> ClientResult<Listing> {
        Listing::from_name_array(body)
    }

    /// Parses the contents of an import file.
    fn parse_records(&self, body: &[u8]) -> ClientResult<Vec<Self::Record>> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Name identifying a record remotely.
    fn record_name<'a>(&self, record: &'a Self::Record) -> &'a str;

    /// Field of an exported entity that holds its name.
    fn id_field(&self) -> &'static str {
        "name"
    }

    /// Method updating an existing entity, or `None` if the kind cannot be
    /// updated in place.
    fn update_method(&self) -> Option<Method> {
        Some(Method::PUT)
    }

    /// Path the create request is posted to.
    fn create_path(&self, config: &ClientConfig, _record: &Self::Record) -> ClientResult<String> {
        self.collection_path(config)
    }

    /// Path of the delete request for one entity.
    fn delete_path(&self, config: &ClientConfig, name: &str) -> ClientResult<String> {
        self.entity_path(config, name)
    }

    /// Path used by the update request.
    fn update_path(&self, config: &ClientConfig, name: &str) -> ClientResult<String> {
        self.entity_path(config, name)
    }

    /// Serializes a record for create and update requests.
    fn payload(&self, record: &Self::Record) -> ClientResult<Vec<u8>> {
        Ok(serde_json::to_vec(record)?)
    }
}

/// One page of a collection listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Entity names on this page.
    pub names: Vec<String>,
    /// Token of the next page, if there is one.
    pub next_page_token: Option<String>,
}

impl Listing {
    /// Parses a plain JSON array of names.
    pub fn from_name_array(body: &[u8]) -> ClientResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(Self {
            names: serde_json::from_slice(body)?,
            next_page_token: None,
        })
    }

    /// Parses an object that holds entities under `field`.
    ///
    /// Elements are either names or objects carrying the name in `id_field`.
    /// A missing field is an empty page.
    pub fn from_envelope(body: &[u8], field: &str, id_field: &str) -> ClientResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body)?;
        let names = value
            .get(field)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(name) => Some(name.clone()),
                        other => other.get(id_field).and_then(Value::as_str).map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let next_page_token = value
            .get("nextPageToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        Ok(Self {
            names,
            next_page_token,
        })
    }
}

/// Parses records that are either a plain array or wrapped under `field`.
pub(crate) fn records_or_envelope<T: DeserializeOwned>(body: &[u8], field: &str) -> ClientResult<Vec<T>> {
    let value: Value = serde_json::from_slice(body)?;
    let items = match value {
        Value::Object(mut map) => map.remove(field).unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    Ok(serde_json::from_value(items)?)
}

/// Returns the environment segment for environment-scoped collections.
pub(crate) fn env_collection(config: &ClientConfig, collection: &str) -> ClientResult<String> {
    let env = config.require_env()?;
    Ok(format!(
        "environments/{}/{collection}",
        urlencoding::encode(env)
    ))
}
