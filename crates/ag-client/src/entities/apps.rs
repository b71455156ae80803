//! Developer apps.
//!
//! Apps are listed and fetched organization-wide by `appId` but created under
//! their developer, so the create path depends on the record. Existing apps
//! are skipped on import. Credentials are not re-created and are left out of
//! the create payload.

use ag_core::ClientConfig;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::products::Attribute;
use super::{records_or_envelope, EntityKind, Listing};
use crate::error::ClientResult;

const ENVELOPE: &str = "app";

/// Developer app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    /// App name, unique per developer.
    pub name: String,
    /// Organization-wide app id, output only.
    #[serde(default, skip_serializing)]
    pub app_id: Option<String>,
    /// Developer owning the app; selects the create path.
    #[serde(default, skip_serializing)]
    pub developer_id: Option<String>,
    /// Issued credentials, output only.
    #[serde(default, skip_serializing)]
    pub credentials: Vec<Value>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Approval status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// OAuth callback URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Custom attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// OAuth scopes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

/// Apps of every developer in the organization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Apps;

impl EntityKind for Apps {
    type Record = App;

    fn label(&self) -> &'static str {
        "app"
    }

    fn export_file(&self) -> String {
        "apps.json".to_string()
    }

    fn collection_path(&self, _config: &ClientConfig) -> ClientResult<String> {
        Ok("apps".to_string())
    }

    fn parse_listing(&self, body: &[u8]) -> ClientResult<Listing> {
        let mut listing = Listing::from_envelope(body, ENVELOPE, "appId")?;
        listing.next_page_token = None;
        Ok(listing)
    }

    fn parse_records(&self, body: &[u8]) -> ClientResult<Vec<App>> {
        records_or_envelope(body, ENVELOPE)
    }

    /// The app id when the record carries one, so exported apps match the
    /// listing; otherwise the app name.
    fn record_name<'a>(&self, record: &'a App) -> &'a str {
        record
            .app_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(&record.name)
    }

    fn id_field(&self) -> &'static str {
        "appId"
    }

    fn create_path(&self, _config: &ClientConfig, record: &App) -> ClientResult<String> {
        let developer = record
            .developer_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ag_core::Error::Validation(format!("app '{}' has no developerId", record.name))
            })?;
        Ok(format!("developers/{}/apps", urlencoding::encode(developer)))
    }

    fn delete_path(&self, _config: &ClientConfig, name: &str) -> ClientResult<String> {
        Err(ag_core::Error::Validation(format!(
            "app '{name}' can only be deleted through its developer"
        ))
        .into())
    }

    fn update_method(&self) -> Option<Method> {
        None
    }
}
