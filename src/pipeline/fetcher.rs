//! Page retrieval through the response cache.

use std::sync::Arc;

use photoreel_common::{Error, PhotoRecord, Result};
use tracing::debug;

use super::request::{PageRequest, PageTarget};
use crate::cache::{KeyBuilder, ResponseCache};
use crate::source::{CollectionInfo, PhotoSource, SourcePage};

/// One page of list records with pagination metadata filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<PhotoRecord>,
    /// The page number that was requested.
    pub number: u32,
    pub total_pages: u32,
    pub total_records: u64,
    pub collection: Option<CollectionInfo>,
}

impl Page {
    fn from_source(number: u32, raw: SourcePage) -> Self {
        Self {
            records: raw.photos,
            number,
            total_pages: raw.pages.unwrap_or(1),
            total_records: raw.total.unwrap_or(0),
            collection: raw.collection,
        }
    }

    pub fn is_last(&self) -> bool {
        self.number >= self.total_pages
    }
}

/// Fetches pages and collection descriptions, consulting the cache first.
#[derive(Clone)]
pub struct PageFetcher {
    source: Arc<dyn PhotoSource>,
    cache: ResponseCache,
}

impl PageFetcher {
    pub fn new(source: Arc<dyn PhotoSource>, cache: ResponseCache) -> Self {
        Self { source, cache }
    }

    /// Fetch the page described by `request`.
    ///
    /// A response without `pages` is treated as the only page and one without
    /// `total` as reporting zero records.
    ///
    /// # Errors
    ///
    /// [`Error::SourceFetch`] when the source call fails.
    pub async fn fetch(&self, request: &PageRequest) -> Result<Page> {
        let key = request.cache_key();
        let raw: SourcePage = self
            .cache
            .fetch(&key, || async {
                match &request.target {
                    PageTarget::Collection { collection, owner } => {
                        self.source
                            .collection_page(
                                collection,
                                owner,
                                request.page,
                                request.per_page,
                                &request.extras,
                            )
                            .await
                    }
                    PageTarget::Search(query) => {
                        self.source
                            .search_page(query, request.page, request.per_page, &request.extras)
                            .await
                    }
                }
            })
            .await
            .map_err(|e| Error::source_fetch(format!("page {}", request.page), format!("{e:#}")))?;

        let page = Page::from_source(request.page, raw);
        debug!(
            page = page.number,
            pages = page.total_pages,
            records = page.records.len(),
            "fetched page"
        );
        Ok(page)
    }

    /// Describe the album or search being walked.
    ///
    /// Albums are looked up at the source through the cache. Searches have no
    /// source-side description, so one is built from the query.
    pub async fn collection_info(&self, target: &PageTarget) -> Result<CollectionInfo> {
        match target {
            PageTarget::Collection { collection, owner } => {
                let key = KeyBuilder::new("collection_info")
                    .collection(collection)
                    .owner(owner)
                    .build();
                self.cache
                    .fetch(&key, || self.source.collection_info(collection, owner))
                    .await
                    .map_err(|e| Error::source_fetch("collection info", format!("{e:#}")))
            }
            PageTarget::Search(query) => Ok(CollectionInfo {
                title: query.describe(),
                description: None,
                total_count: 0,
                owner: query.user.as_ref().map(ToString::to_string),
            }),
        }
    }
}
