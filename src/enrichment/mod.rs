//! Per-photo enrichment.
//!
//! The [`EnrichmentPolicy`] decides, for a [`DetailLevel`], which extra list
//! fields a page request asks the source for and which additional calls are
//! made per photo:
//!
//! | Level      | List extras               | Detail call | Derived URLs |
//! |------------|---------------------------|-------------|--------------|
//! | `basic`    | upload date, description  | no          | no           |
//! | `detailed` | + dates, license, tags    | yes         | no           |
//! | `full`     | + geo, media, original    | yes         | yes          |
//!
//! Detail calls go through the [`ResponseCache`], keyed by photo and owner.

pub mod urls;

pub use urls::{derived_urls, photo_url};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use photoreel_common::{DetailLevel, Error, OwnerId, PhotoId, PhotoRecord, PhotoSize, Result};
use serde::Serialize;
use tracing::debug;

use crate::cache::{KeyBuilder, ResponseCache};
use crate::source::PhotoSource;

const BASIC_EXTRAS: &[&str] = &["date_upload", "description", "owner_name"];

const DETAILED_EXTRAS: &[&str] = &["date_taken", "last_update", "license", "tags", "views"];

const FULL_EXTRAS: &[&str] = &[
    "geo",
    "machine_tags",
    "media",
    "o_dims",
    "original_format",
    "url_o",
];

/// List fields requested from the source at `level`.
///
/// Each level's set contains every field of the levels below it.
pub fn extras_for(level: DetailLevel) -> BTreeSet<&'static str> {
    let tiers: &[&[&str]] = match level {
        DetailLevel::Basic => &[BASIC_EXTRAS],
        DetailLevel::Detailed => &[BASIC_EXTRAS, DETAILED_EXTRAS],
        DetailLevel::Full => &[BASIC_EXTRAS, DETAILED_EXTRAS, FULL_EXTRAS],
    };
    tiers.iter().flat_map(|tier| tier.iter().copied()).collect()
}

// ---------------------------------------------------------------------------
// Enriched records
// ---------------------------------------------------------------------------

/// A photo record after enrichment. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPhoto {
    id: PhotoId,
    detail_level: DetailLevel,
    record: PhotoRecord,
    urls: BTreeMap<PhotoSize, String>,
}

impl EnrichedPhoto {
    /// Wrap a list record as-is, the way `basic` runs see it.
    ///
    /// # Errors
    ///
    /// [`Error::Enrichment`] if the record has no id.
    pub fn from_list(record: PhotoRecord) -> Result<Self> {
        let id = record
            .id()
            .ok_or_else(|| Error::enrichment("<unknown>", "record has no id"))?;
        Ok(Self {
            id,
            detail_level: DetailLevel::Basic,
            record,
            urls: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &PhotoId {
        &self.id
    }

    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    /// The list record, with detail fields merged over it when fetched.
    pub fn record(&self) -> &PhotoRecord {
        &self.record
    }

    /// Derived direct-access URLs. Empty below `full` or when the record
    /// lacks storage coordinates.
    pub fn urls(&self) -> &BTreeMap<PhotoSize, String> {
        &self.urls
    }

    pub fn url(&self, size: PhotoSize) -> Option<&str> {
        self.urls.get(&size).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.record.title()
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Turns list records into [`EnrichedPhoto`]s.
#[derive(Clone)]
pub struct EnrichmentPolicy {
    source: Arc<dyn PhotoSource>,
    cache: ResponseCache,
}

impl EnrichmentPolicy {
    pub fn new(source: Arc<dyn PhotoSource>, cache: ResponseCache) -> Self {
        Self { source, cache }
    }

    /// List fields to request at `level`. See [`extras_for`].
    pub fn extras_for(&self, level: DetailLevel) -> BTreeSet<&'static str> {
        extras_for(level)
    }

    /// Enrich one list record.
    ///
    /// `basic` returns the record unchanged. `detailed` and `full` fetch the
    /// photo's detail record and merge it over the list record, detail fields
    /// winning. `full` then derives direct-access URLs.
    ///
    /// # Errors
    ///
    /// [`Error::Enrichment`] if the record has no id or the detail fetch fails.
    pub async fn enrich(
        &self,
        level: DetailLevel,
        record: PhotoRecord,
        owner: &OwnerId,
    ) -> Result<EnrichedPhoto> {
        if !level.needs_detail() {
            return EnrichedPhoto::from_list(record);
        }

        let id = record
            .id()
            .ok_or_else(|| Error::enrichment("<unknown>", "record has no id"))?;

        let key = KeyBuilder::new("photo_detail").photo(&id).owner(owner).build();
        let detail = self
            .cache
            .fetch(&key, || self.source.photo_detail(&id, owner))
            .await
            .map_err(|e| Error::enrichment(&id, format!("{e:#}")))?;

        let mut merged = record;
        merged.merge_from(&detail);
        debug!(photo_id = %id, fields = merged.len(), "merged photo detail");

        let urls = if level.derives_urls() {
            derived_urls(&merged)
        } else {
            BTreeMap::new()
        };

        Ok(EnrichedPhoto {
            id,
            detail_level: level,
            record: merged,
            urls,
        })
    }
}
