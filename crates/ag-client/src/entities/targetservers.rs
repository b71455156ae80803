//! Environment target servers.

use ag_core::ClientConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{env_collection, EntityKind};
use crate::error::ClientResult;

/// Target server definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetServer {
    /// Target server name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Backend host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Backend port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Whether the target server is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    /// Protocol (HTTP, GRPC, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// TLS settings.
    #[serde(rename = "sSLInfo", default, skip_serializing_if = "Option::is_none")]
    pub ssl_info: Option<SslInfo>,
}

/// TLS settings of a target server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslInfo {
    /// Whether TLS is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whether mutual TLS is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_auth_enabled: Option<bool>,
    /// Keystore reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_store: Option<String>,
    /// Key alias within the keystore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,
    /// Truststore reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_store: Option<String>,
    /// Whether certificate validation errors are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_validation_errors: Option<bool>,
    /// Other TLS fields (protocols, ciphers, common name, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Target servers of the configured environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetServers;

impl EntityKind for TargetServers {
    type Record = TargetServer;

    fn label(&self) -> &'static str {
        "targetserver"
    }

    fn export_file(&self) -> String {
        "targetservers.json".to_string()
    }

    fn collection_path(&self, config: &ClientConfig) -> ClientResult<String> {
        env_collection(config, "targetservers")
    }

    fn record_name<'a>(&self, record: &'a TargetServer) -> &'a str {
        &record.name
    }
}
