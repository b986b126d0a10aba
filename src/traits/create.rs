//! Create trait for adding entities.

use async_trait::async_trait;
use serde::Serialize;

use crate::client::HubClient;
use crate::error::{HubError, Result, ResultExt};
use crate::mime::APPLICATION_JSON;
use crate::traits::get::short_type_name;

/// Create a new entity.
///
/// The Hub answers 201 with the new entity's URL in `Location`.
#[async_trait]
pub trait Create {
    /// Body of the create request.
    type Request: Serialize + Sync;

    /// What the new entity hangs off.
    type Parent: Sync + ?Sized;

    /// URL to POST the request to.
    ///
    /// # Errors
    ///
    /// Returns an error when the parent has no link to the collection.
    fn create_url(client: &HubClient, parent: &Self::Parent) -> Result<String>;

    /// Media type of the request body.
    fn request_content_type() -> &'static str {
        APPLICATION_JSON
    }

    /// Create the entity and return its URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the request or does not return
    /// a `Location` header.
    async fn create(
        client: &HubClient,
        parent: &Self::Parent,
        request: &Self::Request,
    ) -> Result<String> {
        let url = Self::create_url(client, parent)?;
        let location = client
            .post_json(&url, request, Self::request_content_type(), 201)
            .await
            .with_context(|| format!("error trying to create {}", short_type_name::<Self>()))?;
        location.ok_or_else(|| HubError::MissingHeader("Location".to_string()))
    }
}
