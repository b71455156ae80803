//! App developers, identified by email.

use ag_core::ClientConfig;
use serde::{Deserialize, Serialize};

use super::products::Attribute;
use super::{records_or_envelope, EntityKind, Listing};
use crate::error::ClientResult;

const ENVELOPE: &str = "developer";

/// App developer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Developer {
    /// Developer email, unique within the organization.
    pub email: String,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Custom attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Platform id of the developer, output only.
    #[serde(default, skip_serializing)]
    pub developer_id: Option<String>,
    /// Account status, output only.
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
    /// Owning organization, output only.
    #[serde(default, skip_serializing)]
    pub organization_name: Option<String>,
    /// Names of the developer's apps, output only.
    #[serde(default, skip_serializing)]
    pub apps: Vec<String>,
    /// Creation time, output only.
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    /// Last modification time, output only.
    #[serde(default, skip_serializing)]
    pub last_modified_at: Option<String>,
}

/// Developers of the organization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Developers;

impl EntityKind for Developers {
    type Record = Developer;

    fn label(&self) -> &'static str {
        "developer"
    }

    fn export_file(&self) -> String {
        "developers.json".to_string()
    }

    fn collection_path(&self, _config: &ClientConfig) -> ClientResult<String> {
        Ok("developers".to_string())
    }

    fn parse_listing(&self, body: &[u8]) -> ClientResult<Listing> {
        let mut listing = Listing::from_envelope(body, ENVELOPE, "email")?;
        listing.next_page_token = None;
        Ok(listing)
    }

    fn parse_records(&self, body: &[u8]) -> ClientResult<Vec<Developer>> {
        records_or_envelope(body, ENVELOPE)
    }

    fn record_name<'a>(&self, record: &'a Developer) -> &'a str {
        &record.email
    }

    fn id_field(&self) -> &'static str {
        "email"
    }
}
