//! Photo source abstraction.
//!
//! A [`PhotoSource`] is the remote API the pipeline pages through. The
//! pipeline treats it as opaque: it asks for collection descriptions, pages of
//! list records, and per-photo detail records, and never looks at transport
//! details. [`flickr::FlickrClient`] is the HTTP implementation.
//!
//! # Module layout
//!
//! - [`flickr`] -- REST client for the Flickr-style JSON API.

pub mod flickr;

pub use flickr::FlickrClient;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use photoreel_common::{CollectionId, Error, OwnerId, PhotoId, PhotoRecord, SafetyLevel};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Collection description
// ---------------------------------------------------------------------------

/// Descriptive metadata for an album or search job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Display title.
    pub title: String,
    /// Free-text description, if the source has one.
    pub description: Option<String>,
    /// Number of photos the source says the collection holds.
    pub total_count: u64,
    /// Owner account id as reported by the source.
    pub owner: Option<String>,
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// One page of list records exactly as the source reported it.
///
/// Pagination fields are optional because sources under-report them; the
/// page fetcher applies defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcePage {
    /// Records in source order.
    pub photos: Vec<PhotoRecord>,
    /// Page number echoed back by the source.
    pub page: Option<u32>,
    /// Total number of pages.
    pub pages: Option<u32>,
    /// Total number of records across all pages.
    pub total: Option<u64>,
    /// Collection description embedded in the page response, if any.
    pub collection: Option<CollectionInfo>,
}

// ---------------------------------------------------------------------------
// Search queries
// ---------------------------------------------------------------------------

/// How multiple search tags combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    /// Photos carrying any of the tags.
    #[default]
    Any,
    /// Photos carrying every tag.
    All,
}

impl fmt::Display for TagMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for TagMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            other => Err(Error::input(format!(
                "unknown tag mode '{other}' (expected any or all)"
            ))),
        }
    }
}

/// Free-form search parameters used instead of a collection id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Full-text query.
    pub text: Option<String>,
    /// Tags to match.
    pub tags: Vec<String>,
    pub tag_mode: TagMode,
    /// Restrict results to one owner.
    pub user: Option<OwnerId>,
    /// Content filter.
    pub safety: SafetyLevel,
    /// Source-specific sort order (e.g. `"date-posted-desc"`).
    pub sort: Option<String>,
}

impl SearchQuery {
    /// Check that the query can select anything at all.
    pub fn validate(&self) -> photoreel_common::Result<()> {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !has_text && self.tags.is_empty() && self.user.is_none() {
            return Err(Error::input(
                "search needs at least one of text, tags or user",
            ));
        }
        Ok(())
    }

    /// Short human-readable description, used as the synthetic collection title.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(text) = &self.text {
            parts.push(format!("text \"{text}\""));
        }
        if !self.tags.is_empty() {
            parts.push(format!("tags [{}] ({})", self.tags.join(", "), self.tag_mode));
        }
        if let Some(user) = &self.user {
            parts.push(format!("user {user}"));
        }
        format!("search: {}", parts.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Async trait implemented by every photo source.
///
/// Implementations own transport concerns (timeouts, client-side rate
/// limiting). The pipeline calls them strictly one at a time.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Short, lowercase identifier for this source (e.g. `"flickr"`).
    fn name(&self) -> &'static str;

    /// Fetch the description of a collection.
    async fn collection_info(
        &self,
        collection: &CollectionId,
        owner: &OwnerId,
    ) -> anyhow::Result<CollectionInfo>;

    /// Fetch one page of a collection's photo list.
    async fn collection_page(
        &self,
        collection: &CollectionId,
        owner: &OwnerId,
        page: u32,
        per_page: u32,
        extras: &[String],
    ) -> anyhow::Result<SourcePage>;

    /// Fetch one page of search results.
    async fn search_page(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
        extras: &[String],
    ) -> anyhow::Result<SourcePage>;

    /// Fetch the detail record of a single photo.
    async fn photo_detail(&self, photo: &PhotoId, owner: &OwnerId)
        -> anyhow::Result<PhotoRecord>;
}
