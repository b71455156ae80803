//! Single-entity operations.

use ag_core::ClientConfig;

use crate::entities::EntityKind;
use crate::error::ClientResult;
use crate::transport::{ApiRequest, Transport};

/// Fetches one entity and returns its raw body.
pub async fn get_entity<K: EntityKind>(
    transport: &dyn Transport,
    kind: &K,
    config: &ClientConfig,
    name: &str,
) -> ClientResult<Vec<u8>> {
    let path = kind.entity_path(config, name)?;
    transport
        .send(ApiRequest::get(path))
        .await
        .map_err(|e| e.for_entity(kind.label(), name))
}

/// Deletes one entity.
pub async fn delete_entity<K: EntityKind>(
    transport: &dyn Transport,
    kind: &K,
    config: &ClientConfig,
    name: &str,
) -> ClientResult<()> {
    let path = kind.delete_path(config, name)?;
    transport
        .send(ApiRequest::delete(path))
        .await
        .map_err(|e| e.for_entity(kind.label(), name))?;
    tracing::debug!(kind = kind.label(), name, "deleted");
    Ok(())
}
