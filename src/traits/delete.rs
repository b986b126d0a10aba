//! Delete trait for removing entities.

use async_trait::async_trait;

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::HasMeta;
use crate::mime::APPLICATION_JSON;

/// Delete an entity. The Hub answers 204.
#[async_trait]
pub trait Delete: HasMeta + Sync {
    /// Delete this entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn delete(&self, client: &HubClient) -> Result<()> {
        delete_href(client, self.href()).await
    }
}

/// Delete whatever lives at `href`.
///
/// # Errors
///
/// Returns an error if the server does not answer 204.
pub async fn delete_href(client: &HubClient, href: &str) -> Result<()> {
    client
        .delete(href, APPLICATION_JSON, 204)
        .await
        .with_context(|| format!("error trying to delete {href}"))
}
