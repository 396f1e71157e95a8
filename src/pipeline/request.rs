//! Page requests and the strategies that produce them.
//!
//! The driver does not know whether it walks an album or search results. It
//! asks a [`PageRequestProvider`] for the request of page N and for the owner
//! of each record; [`CollectionPages`] and [`SearchPages`] are the two
//! strategies.

use photoreel_common::{CollectionId, OwnerId, PhotoRecord, RunMode};

use crate::cache::{CacheKey, KeyBuilder};
use crate::reference::CollectionRef;
use crate::source::SearchQuery;

/// What a page request addresses.
#[derive(Debug, Clone, PartialEq)]
pub enum PageTarget {
    /// One album of one owner.
    Collection {
        collection: CollectionId,
        owner: OwnerId,
    },
    /// A search query.
    Search(SearchQuery),
}

impl PageTarget {
    pub fn collection_id(&self) -> Option<&CollectionId> {
        match self {
            Self::Collection { collection, .. } => Some(collection),
            Self::Search(_) => None,
        }
    }
}

/// A request for one page of list records.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub target: PageTarget,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    /// Optional list fields to ask the source for.
    pub extras: Vec<String>,
}

impl PageRequest {
    /// Cache key for this request.
    ///
    /// Two requests share a key exactly when their target, page, page size
    /// and extras set are equal; extras order and duplicates are ignored.
    pub fn cache_key(&self) -> CacheKey {
        let builder = match &self.target {
            PageTarget::Collection { collection, owner } => KeyBuilder::new("collection_page")
                .collection(collection)
                .owner(owner),
            PageTarget::Search(query) => {
                let builder = KeyBuilder::new("search_page")
                    .opt_param("text", query.text.as_deref())
                    .list_param("tags", query.tags.iter().map(String::as_str))
                    .param("tag_mode", query.tag_mode)
                    .param("safe_search", query.safety.code())
                    .opt_param("sort", query.sort.as_deref());
                match &query.user {
                    Some(user) => builder.owner(user),
                    None => builder,
                }
            }
        };

        builder
            .param("page", self.page)
            .param("per_page", self.per_page)
            .list_param("extras", self.extras.iter().map(String::as_str))
            .build()
    }
}

/// Strategy that addresses the pages of one run.
pub trait PageRequestProvider: Send + Sync {
    /// Which kind of run this is. Selects the default failure policy.
    fn mode(&self) -> RunMode;

    /// The album or query being walked.
    fn target(&self) -> &PageTarget;

    /// The owner to address per-photo calls with.
    fn owner_for(&self, record: &PhotoRecord) -> Option<OwnerId>;

    /// Request for page `page`.
    fn request(&self, page: u32, per_page: u32, extras: &[String]) -> PageRequest {
        PageRequest {
            target: self.target().clone(),
            page,
            per_page,
            extras: extras.to_vec(),
        }
    }
}

/// Pages of a single album.
#[derive(Debug, Clone)]
pub struct CollectionPages {
    target: PageTarget,
    owner: OwnerId,
}

impl CollectionPages {
    pub fn new(reference: CollectionRef) -> Self {
        Self {
            owner: reference.owner.clone(),
            target: PageTarget::Collection {
                collection: reference.collection,
                owner: reference.owner,
            },
        }
    }
}

impl PageRequestProvider for CollectionPages {
    fn mode(&self) -> RunMode {
        RunMode::Album
    }

    fn target(&self) -> &PageTarget {
        &self.target
    }

    /// Every photo of an album is addressed through the album owner.
    fn owner_for(&self, _record: &PhotoRecord) -> Option<OwnerId> {
        Some(self.owner.clone())
    }
}

/// Pages of search results.
#[derive(Debug, Clone)]
pub struct SearchPages {
    target: PageTarget,
    user: Option<OwnerId>,
}

impl SearchPages {
    /// Wrap a query. Fails with an input error if the query selects nothing.
    pub fn new(query: SearchQuery) -> photoreel_common::Result<Self> {
        query.validate()?;
        Ok(Self {
            user: query.user.clone(),
            target: PageTarget::Search(query),
        })
    }
}

impl PageRequestProvider for SearchPages {
    fn mode(&self) -> RunMode {
        RunMode::Search
    }

    fn target(&self) -> &PageTarget {
        &self.target
    }

    /// Search results carry their own owner; a user-scoped query supplies
    /// one for records that don't.
    fn owner_for(&self, record: &PhotoRecord) -> Option<OwnerId> {
        record.owner().or_else(|| self.user.clone())
    }
}
