//! Pagination over Hub list endpoints.
//!
//! List endpoints take `limit`, `offset`, `sort` and `q` query parameters and
//! answer with an [`ItemList`] envelope whose `totalCount` says how many items
//! exist across all pages.
//!
//! Pages are fetched one at a time in increasing offset order. There is no
//! snapshot isolation: an item added or removed between two page fetches may
//! be skipped or seen twice.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::{HubError, Result, ResultExt};
use crate::links::{HasMeta, Meta};
use crate::mime::ContentType;

/// Page size used when the caller does not set one.
pub const DEFAULT_LIMIT: u32 = 100;

/// Paging, sorting and filtering options for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Maximum items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Index of the first item to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Sort expression, e.g. `name ASC`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Filter expression, e.g. `name:my-project`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl ListOptions {
    /// Options for the first page with the default page size.
    #[must_use]
    pub fn first_page() -> Self {
        let mut options = Self::default();
        options.ensure_limits();
        options
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Fill in the default limit (100) and offset (0) where unset.
    pub fn ensure_limits(&mut self) -> &mut Self {
        self.limit.get_or_insert(DEFAULT_LIMIT);
        self.offset.get_or_insert(0);
        self
    }

    /// Advance the offset by one page. The limit is unchanged.
    pub fn next_page(&mut self) -> &mut Self {
        self.ensure_limits();
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = self.offset.unwrap_or(0);
        self.offset = Some(offset.saturating_add(limit));
        self
    }

    /// Query parameters for the options that are set.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        pairs
    }
}

/// Pages that report how many items exist in total.
pub trait TotalCount {
    fn total_count(&self) -> u64;
}

/// One page of a Hub list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList<T> {
    /// Number of items across all pages.
    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub applied_filters: Vec<serde_json::Value>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            applied_filters: Vec::new(),
            meta: Meta::default(),
            items: Vec::new(),
        }
    }
}

impl<T> ItemList<T> {
    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> TotalCount for ItemList<T> {
    fn total_count(&self) -> u64 {
        self.total_count
    }
}

impl<T> HasMeta for ItemList<T> {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl<T: ContentType> ContentType for ItemList<T> {
    fn content_type() -> Option<&'static str> {
        T::content_type()
    }
}

impl<T> IntoIterator for ItemList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ItemList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Just the count of a list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTotal {
    #[serde(default)]
    total_count: u64,
}

impl ContentType for ListTotal {}

impl HubClient {
    /// Number of items behind a list URL, fetched with one `limit=1` request.
    pub async fn count(&self, url: &str) -> Result<u64> {
        self.count_with(url, None).await
    }

    /// Like [`count`](Self::count), sending `accept` as the `Accept` header.
    #[tracing::instrument(skip(self))]
    pub async fn count_with(&self, url: &str, accept: Option<&str>) -> Result<u64> {
        let options = ListOptions::default().with_limit(1).with_offset(0);
        let page_url = self.page_url(url, &options)?;
        let total: ListTotal = self
            .get_json_with(&page_url, &[200], accept)
            .await
            .context("error trying to retrieve count")?;
        Ok(total.total_count)
    }

    /// Fetch one page, adding the set options as query parameters.
    #[tracing::instrument(skip(self))]
    pub async fn get_page<P>(&self, url: &str, options: &ListOptions) -> Result<P>
    where
        P: DeserializeOwned + ContentType,
    {
        let page_url = self.page_url(url, options)?;
        self.get_json(&page_url)
            .await
            .with_context(|| format!("error trying to retrieve list {}", std::any::type_name::<P>()))
    }

    /// Fetch every page in order, handing each to `on_page`.
    ///
    /// Starts at the caller's offset (default 0) and stops once the offset
    /// reaches the total count reported by the last page. A page that fails
    /// to decode, or a callback error, ends the walk with that error.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::RequestConstruction`] for a zero limit.
    pub async fn for_each_page<P, F>(&self, url: &str, options: ListOptions, mut on_page: F) -> Result<()>
    where
        P: DeserializeOwned + ContentType + TotalCount + Send,
        F: FnMut(P) -> Result<()> + Send,
    {
        let mut options = options;
        options.ensure_limits();
        if options.limit == Some(0) {
            return Err(HubError::RequestConstruction(
                "list limit must be greater than zero".to_string(),
            ));
        }

        loop {
            let page: P = self.get_page(url, &options).await?;
            let total = page.total_count();
            on_page(page)?;

            options.next_page();
            let offset = u64::from(options.offset.unwrap_or(0));
            tracing::trace!(url, offset, total, "page done");
            if offset >= total {
                return Ok(());
            }
        }
    }

    /// Collect the items of every page into one vector.
    pub async fn list_all<T>(&self, url: &str, options: ListOptions) -> Result<Vec<T>>
    where
        T: DeserializeOwned + ContentType + Send,
    {
        let mut all_items = Vec::new();
        self.for_each_page(url, options, |page: ItemList<T>| {
            all_items.extend(page.items);
            Ok(())
        })
        .await?;
        Ok(all_items)
    }

    pub(crate) fn page_url(&self, url: &str, options: &ListOptions) -> Result<String> {
        let mut target = self.resolve(url)?;
        let pairs = options.to_query_pairs();
        if !pairs.is_empty() {
            target.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(target.into())
    }
}
