//! Hypermedia links embedded in Hub responses.
//!
//! Nearly every Hub resource carries a `_meta` block listing the methods it
//! allows, its own `href`, and links to related resources. Navigation through
//! the API follows these links instead of building URLs by hand.

use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

/// A `{rel, href}` pair pointing at a related resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    /// Link relation, e.g. `versions` or `components`. Not unique.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rel: String,

    /// Absolute URL of the related resource.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub href: String,

    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Name of the linked resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceLink {
    /// Build a bare link to `href` with no relation.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }
}

impl From<&str> for ResourceLink {
    fn from(href: &str) -> Self {
        Self::new(href)
    }
}

impl From<String> for ResourceLink {
    fn from(href: String) -> Self {
        Self::new(href)
    }
}

/// The `_meta` block of a Hub resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// HTTP methods the resource accepts.
    #[serde(default)]
    pub allow: Vec<String>,

    /// Canonical URL of the resource.
    #[serde(default)]
    pub href: String,

    /// Related resources, in server order.
    #[serde(default)]
    pub links: Vec<ResourceLink>,
}

impl Meta {
    /// Returns the first link with the relation `rel`.
    ///
    /// Other links may share the relation; use [`Meta::links_by_rel`] to
    /// get all of them.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::LinkNotFound`] when no link matches.
    pub fn find_link_by_rel(&self, rel: &str) -> Result<&ResourceLink> {
        self.links
            .iter()
            .find(|l| l.rel == rel)
            .ok_or_else(|| HubError::LinkNotFound(rel.to_string()))
    }

    /// Returns every link with the relation `rel`, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::LinkNotFound`] when no link matches.
    pub fn links_by_rel(&self, rel: &str) -> Result<Vec<&ResourceLink>> {
        let links: Vec<&ResourceLink> = self.links.iter().filter(|l| l.rel == rel).collect();
        if links.is_empty() {
            return Err(HubError::LinkNotFound(rel.to_string()));
        }
        Ok(links)
    }

    /// Whether the resource allows the HTTP method (case-insensitive).
    pub fn allows(&self, method: &str) -> bool {
        self.allow.iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    /// A link to the resource itself.
    pub fn self_link(&self) -> ResourceLink {
        ResourceLink::new(self.href.clone())
    }
}

/// Resources that carry a `_meta` block.
pub trait HasMeta {
    /// The resource metadata.
    fn meta(&self) -> &Meta;

    /// Canonical URL of the resource.
    fn href(&self) -> &str {
        &self.meta().href
    }

    /// First link with the given relation.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::LinkNotFound`] when no link matches.
    fn link(&self, rel: &str) -> Result<&ResourceLink> {
        self.meta().find_link_by_rel(rel)
    }
}

impl HasMeta for Meta {
    fn meta(&self) -> &Meta {
        self
    }
}
