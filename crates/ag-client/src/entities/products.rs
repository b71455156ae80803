//! API products.

use ag_core::ClientConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{records_or_envelope, EntityKind, Listing};
use crate::error::ClientResult;

const ENVELOPE: &str = "apiProduct";

/// API product definition.
///
/// Operation groups, quotas and other nested settings are carried through
/// untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProduct {
    /// Product name.
    pub name: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `auto` or `manual`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_type: Option<String>,
    /// Custom attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Environments the product is available in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<String>,
    /// Proxies bundled by the product.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<String>,
    /// OAuth scopes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Remaining product settings.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Custom name/value attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    #[serde(default)]
    pub value: String,
}

/// API products of the organization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Products;

impl EntityKind for Products {
    type Record = ApiProduct;

    fn label(&self) -> &'static str {
        "product"
    }

    fn export_file(&self) -> String {
        "products.json".to_string()
    }

    fn collection_path(&self, _config: &ClientConfig) -> ClientResult<String> {
        Ok("apiproducts".to_string())
    }

    fn parse_listing(&self, body: &[u8]) -> ClientResult<Listing> {
        let mut listing = Listing::from_envelope(body, ENVELOPE, "name")?;
        // Product listings are not token-paged.
        listing.next_page_token = None;
        Ok(listing)
    }

    fn parse_records(&self, body: &[u8]) -> ClientResult<Vec<ApiProduct>> {
        records_or_envelope(body, ENVELOPE)
    }

    fn record_name<'a>(&self, record: &'a ApiProduct) -> &'a str {
        &record.name
    }
}
