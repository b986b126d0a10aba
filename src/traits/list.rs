//! List trait for fetching collections of entities.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::mime::ContentType;
use crate::pagination::{ItemList, ListOptions};
use crate::traits::get::short_type_name;

/// List entities with pagination support.
///
/// Implementations say where the collection lives: a top-level path such as
/// `/api/projects` (with `Parent = ()`), or a link on a parent resource.
///
/// # Example
///
/// ```ignore
/// use hubclient::{HubClient, ListOptions, Project, List};
///
/// let client = HubClient::from_env().await?;
///
/// // Fetch a single page
/// let page = Project::list_page(&client, &(), &ListOptions::first_page()).await?;
///
/// // Fetch all pages
/// let all_projects = Project::list_all(&client, &(), ListOptions::default()).await?;
/// ```
#[async_trait]
pub trait List: DeserializeOwned + ContentType + Send + Sized {
    /// What the collection hangs off.
    type Parent: Sync + ?Sized;

    /// URL of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::LinkNotFound`](crate::HubError::LinkNotFound) when
    /// the parent has no link to the collection.
    fn collection_url(client: &HubClient, parent: &Self::Parent) -> Result<String>;

    /// Fetch one page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &HubClient,
        parent: &Self::Parent,
        options: &ListOptions,
    ) -> Result<ItemList<Self>> {
        let url = Self::collection_url(client, parent)?;
        client.get_page(&url, options).await
    }

    /// Fetch every page and collect the items.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(
        client: &HubClient,
        parent: &Self::Parent,
        options: ListOptions,
    ) -> Result<Vec<Self>> {
        let url = Self::collection_url(client, parent)?;
        client
            .list_all(&url, options)
            .await
            .with_context(|| format!("error trying to list every {}", short_type_name::<Self>()))
    }

    /// Number of entities in the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn count(client: &HubClient, parent: &Self::Parent) -> Result<u64> {
        let url = Self::collection_url(client, parent)?;
        client.count_with(&url, Self::content_type()).await
    }
}
