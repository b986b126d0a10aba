//! Get trait for fetching single entities.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::client::HubClient;
use crate::error::{Result, ResultExt};
use crate::links::ResourceLink;
use crate::mime::ContentType;

/// Fetch a single entity from its link.
///
/// Hub resources are addressed by the `href` values found in other
/// resources' `_meta` blocks, so there is nothing to implement beyond the
/// content type.
///
/// # Example
///
/// ```ignore
/// use hubclient::{HubClient, Project, Get};
///
/// let client = HubClient::from_env().await?;
/// let project = Project::get(&client, &link).await?;
/// ```
#[async_trait]
pub trait Get: DeserializeOwned + ContentType + Send + Sized {
    /// Fetch the entity `link` points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(client: &HubClient, link: &ResourceLink) -> Result<Self> {
        Self::get_href(client, &link.href).await
    }

    /// Fetch the entity at `href`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get_href(client: &HubClient, href: &str) -> Result<Self> {
        client
            .get_json(href)
            .await
            .with_context(|| format!("error trying to retrieve {}", short_type_name::<Self>()))
    }
}

/// Last path segment of a type name, e.g. `Project`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}
