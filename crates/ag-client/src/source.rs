//! Entity sources: the remote collection listing and local import files.
//!
//! Both run before a batch starts, so any error here is a setup error that
//! aborts the command.

use std::collections::HashSet;
use std::path::Path;

use ag_core::{ClientConfig, MembershipSet};

use crate::entities::EntityKind;
use crate::error::{ClientError, ClientResult};
use crate::transport::{ApiRequest, Transport};

/// Lists every entity name of a collection, following page tokens.
pub async fn list_names<K: EntityKind>(
    transport: &dyn Transport,
    kind: &K,
    config: &ClientConfig,
) -> ClientResult<Vec<String>> {
    let mut names = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut page_token: Option<String> = None;

    loop {
        let path = kind.listing_path(config, page_token.as_deref())?;
        let body = transport.send(ApiRequest::get(path)).await?;
        let listing = kind.parse_listing(&body)?;
        names.extend(listing.names);

        match listing.next_page_token {
            // A token seen before would loop forever.
            Some(token) if seen_tokens.insert(token.clone()) => page_token = Some(token),
            _ => break,
        }
    }

    tracing::debug!(kind = kind.label(), count = names.len(), "listed collection");
    Ok(names)
}

/// Lists the collection into a membership set for import classification.
pub async fn fetch_membership<K: EntityKind>(
    transport: &dyn Transport,
    kind: &K,
    config: &ClientConfig,
) -> ClientResult<MembershipSet> {
    Ok(list_names(transport, kind, config).await?.into_iter().collect())
}

/// Reads and parses an import file.
pub fn read_records<K: EntityKind>(kind: &K, path: &Path) -> ClientResult<Vec<K::Record>> {
    let source_error = |message: String| ClientError::Source {
        path: path.display().to_string(),
        message,
    };
    let body = std::fs::read(path).map_err(|e| source_error(e.to_string()))?;
    kind.parse_records(&body).map_err(|e| source_error(e.to_string()))
}
