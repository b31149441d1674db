//! Domain types for the posts resource.
//!
//! # Design
//! `Post` is the client-side view of a post, already flattened from the
//! server's `{"rendered": ..}` wrappers by the mapper. Write payloads use
//! `PostFields`, a fixed set of optional attributes: only the fields that
//! are `Some` reach the wire, which is what gives update its merge
//! semantics on the server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned identity of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A single post returned by the API.
///
/// `content_html` holds the HTML exactly as the server sent it. The client
/// never escapes, sanitizes or trims it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub content_html: String,
    /// Unrendered content, only present when the server includes it (edit
    /// context).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_raw: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub link: String,
}

/// Attributes accepted by create and update. Omitted fields are left
/// unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl PostFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Query options for listing posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListOptions {
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ListOptions {
    pub fn per_page(per_page: u32) -> Self {
        Self {
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(per_page) = self.per_page {
            query.push(("per_page".to_string(), per_page.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        query
    }
}

/// Options for deleting a post. `force: false` (the default) moves the post
/// to the trash; `force: true` removes it permanently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteOptions {
    #[serde(default)]
    pub force: bool,
}

impl DeleteOptions {
    pub fn force() -> Self {
        Self { force: true }
    }
}
