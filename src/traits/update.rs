//! Update trait for modifying entities.

use async_trait::async_trait;
use serde::Serialize;

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::HasMeta;
use crate::mime::APPLICATION_JSON;
use crate::traits::get::short_type_name;

/// Update an existing entity in place.
///
/// The request is PUT to the entity's own `href`.
///
/// # Example
///
/// ```ignore
/// use hubclient::{HubClient, Project, ProjectRequest, Update};
///
/// let request = ProjectRequest {
///     description: Some("New description".to_string()),
///     ..ProjectRequest::new(&project.name)
/// };
/// project.update(&client, &request).await?;
/// ```
#[async_trait]
pub trait Update: HasMeta + Sync {
    /// Body of the update request.
    type Request: Serialize + Sync;

    /// Media type of the request body.
    fn request_content_type() -> &'static str {
        APPLICATION_JSON
    }

    /// Replace the entity's fields with `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn update(&self, client: &HubClient, request: &Self::Request) -> Result<()> {
        client
            .put_json(self.href(), request, Self::request_content_type(), 200)
            .await
            .with_context(|| format!("error trying to update {}", short_type_name::<Self>()))
    }
}
