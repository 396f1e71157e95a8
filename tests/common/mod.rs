//! Shared fixtures for pipeline integration tests.
//!
//! Provides [`StubSource`], a scripted [`PhotoSource`] that serves fixed
//! pages and records every call, and [`Recorder`], a subscriber that keeps
//! the events it sees and can ask to stop at a chosen ordinal.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use photoreel::cache::{MemoryCache, ResponseCache};
use photoreel::pipeline::{Flow, PhotoEvent, Subscriber};
use photoreel::source::{CollectionInfo, PhotoSource, SearchQuery, SourcePage};
use photoreel_common::{CollectionId, OwnerId, PhotoId, PhotoRecord};
use serde_json::json;

/// A source call, as seen by [`StubSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Info,
    Page(u32),
    Search(u32),
    Detail(String),
}

/// Scripted photo source.
///
/// Page `n` (1-based) is `pages[n - 1]`; requests past the end get an empty
/// page. Photo ids listed in `failing_details` make the detail call fail.
#[derive(Default)]
pub struct StubSource {
    pub pages: Vec<SourcePage>,
    pub failing_details: HashSet<String>,
    pub fail_page: Option<u32>,
    pub fail_info: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl StubSource {
    /// Pages of the given sizes, with ids numbered 1.. across pages and
    /// pagination metadata reporting `sizes.len()` pages.
    pub fn with_page_sizes(sizes: &[usize]) -> Self {
        let total: usize = sizes.iter().sum();
        let mut next_id = 0;
        let pages = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let photos = (0..size)
                    .map(|_| {
                        next_id += 1;
                        photo(&next_id.to_string())
                    })
                    .collect();
                SourcePage {
                    photos,
                    page: Some(i as u32 + 1),
                    pages: Some(sizes.len() as u32),
                    total: Some(total as u64),
                    collection: None,
                }
            })
            .collect();

        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing_detail(mut self, id: &str) -> Self {
        self.failing_details.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn page_calls(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Page(n) | Call::Search(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn serve(&self, page: u32) -> anyhow::Result<SourcePage> {
        if self.fail_page == Some(page) {
            anyhow::bail!("page {page} unavailable");
        }
        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl PhotoSource for StubSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn collection_info(
        &self,
        _collection: &CollectionId,
        owner: &OwnerId,
    ) -> anyhow::Result<CollectionInfo> {
        self.calls.lock().push(Call::Info);
        if self.fail_info {
            anyhow::bail!("album not found");
        }
        Ok(CollectionInfo {
            title: "Harbour".into(),
            description: Some("Boats at night".into()),
            total_count: self.pages.iter().map(|p| p.photos.len() as u64).sum(),
            owner: Some(owner.to_string()),
        })
    }

    async fn collection_page(
        &self,
        _collection: &CollectionId,
        _owner: &OwnerId,
        page: u32,
        _per_page: u32,
        _extras: &[String],
    ) -> anyhow::Result<SourcePage> {
        self.calls.lock().push(Call::Page(page));
        self.serve(page)
    }

    async fn search_page(
        &self,
        _query: &SearchQuery,
        page: u32,
        _per_page: u32,
        _extras: &[String],
    ) -> anyhow::Result<SourcePage> {
        self.calls.lock().push(Call::Search(page));
        self.serve(page)
    }

    async fn photo_detail(&self, photo: &PhotoId, owner: &OwnerId) -> anyhow::Result<PhotoRecord> {
        self.calls.lock().push(Call::Detail(photo.to_string()));
        if self.failing_details.contains(photo.as_str()) {
            anyhow::bail!("photo {photo} is private");
        }
        Ok(serde_json::from_value(json!({
            "id": photo.as_str(),
            "owner": owner.as_str(),
            "secret": format!("s{photo}"),
            "views": "10",
        }))?)
    }
}

/// A list record with storage coordinates but no secret.
pub fn photo(id: &str) -> PhotoRecord {
    serde_json::from_value(json!({
        "id": id,
        "title": format!("photo {id}"),
        "farm": 1,
        "server": "2",
    }))
    .unwrap()
}

/// Subscriber that records events and optionally stops at an ordinal.
pub struct Recorder {
    pub name: &'static str,
    pub stop_at: Option<u64>,
    pub events: Mutex<Vec<PhotoEvent>>,
}

impl Recorder {
    pub fn new(name: &'static str) -> Arc<Self> {
        Self::stopping_at(name, None)
    }

    pub fn stopping_at(name: &'static str, ordinal: Option<u64>) -> Arc<Self> {
        Arc::new(Self {
            name,
            stop_at: ordinal,
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn ordinals(&self) -> Vec<u64> {
        self.events.lock().iter().map(|e| e.context.ordinal).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.photo.id().to_string())
            .collect()
    }
}

impl Subscriber for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn on_photo(&self, event: &PhotoEvent) -> Flow {
        self.events.lock().push(event.clone());
        if self.stop_at == Some(event.context.ordinal) {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}

/// Memory-backed cache with a one-minute TTL.
pub fn memory_cache() -> ResponseCache {
    ResponseCache::new(Arc::new(MemoryCache::new(1024)), Duration::from_secs(60))
}
