//! Environment groups.

use ag_core::ClientConfig;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{records_or_envelope, EntityKind, Listing};
use crate::error::ClientResult;

const ENVELOPE: &str = "environmentGroups";

/// Environment group and the host names it serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvGroup {
    /// Group name.
    pub name: String,
    /// Host names routed to the group.
    #[serde(default)]
    pub hostnames: Vec<String>,
    /// Creation time, output only.
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    /// Last modification time, output only.
    #[serde(default, skip_serializing)]
    pub last_modified_at: Option<String>,
    /// Provisioning state, output only.
    #[serde(default, skip_serializing)]
    pub state: Option<String>,
}

/// Environment groups of the organization.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvGroups;

impl EntityKind for EnvGroups {
    type Record = EnvGroup;

    fn label(&self) -> &'static str {
        "envgroup"
    }

    fn export_file(&self) -> String {
        "envgroups.json".to_string()
    }

    fn collection_path(&self, _config: &ClientConfig) -> ClientResult<String> {
        Ok("envgroups".to_string())
    }

    fn parse_listing(&self, body: &[u8]) -> ClientResult<Listing> {
        Listing::from_envelope(body, ENVELOPE, "name")
    }

    fn parse_records(&self, body: &[u8]) -> ClientResult<Vec<EnvGroup>> {
        records_or_envelope(body, ENVELOPE)
    }

    fn record_name<'a>(&self, record: &'a EnvGroup) -> &'a str {
        &record.name
    }

    fn update_method(&self) -> Option<Method> {
        Some(Method::PATCH)
    }

    fn update_path(&self, config: &ClientConfig, name: &str) -> ClientResult<String> {
        Ok(format!("{}?updateMask=hostnames", self.entity_path(config, name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_patch_host_names() {
        let config = ClientConfig::new("acme");
        assert_eq!(EnvGroups.update_method(), Some(Method::PATCH));
        assert_eq!(
            EnvGroups.update_path(&config, "public").unwrap(),
            "envgroups/public?updateMask=hostnames"
        );
    }

    #[test]
    fn output_only_fields_are_not_sent() {
        let body = br#"{"environmentGroups":[{"name":"public","hostnames":["api.example.com"],"state":"ACTIVE","createdAt":"1"}]}"#;
        let records = EnvGroups.parse_records(body).unwrap();
        assert_eq!(records[0].state.as_deref(), Some("ACTIVE"));
        let payload = EnvGroups.payload(&records[0]).unwrap();
        assert_eq!(
            payload,
            br#"{"name":"public","hostnames":["api.example.com"]}"#.to_vec()
        );
    }

    #[test]
    fn listing_follows_page_tokens() {
        let listing = EnvGroups
            .parse_listing(br#"{"environmentGroups":[{"name":"a"}],"nextPageToken":"next"}"#)
            .unwrap();
        assert_eq!(listing.next_page_token.as_deref(), Some("next"));
        let config = ClientConfig::new("acme");
        assert_eq!(
            EnvGroups.listing_path(&config, Some("next")).unwrap(),
            "envgroups?pageToken=next"
        );
    }
}
