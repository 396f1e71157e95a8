//! The pagination loop.
//!
//! A run walks pages in ascending order from the start page. Each record is
//! enriched, wrapped in a [`PhotoEvent`] and dispatched before the next one
//! is looked at. The run ends when:
//!
//! - the last reported page has been processed, or a page comes back empty
//!   ([`RunStatus::Exhausted`]);
//! - a subscriber asks to stop ([`StopReason::Subscriber`]);
//! - the photo limit is reached ([`StopReason::Limit`]);
//! - a fetch fails, or an enrichment fails under [`FailurePolicy::Abort`]
//!   ([`RunFailure`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use photoreel_common::{
    DetailLevel, Error, FailurePolicy, OwnerId, PhotoRecord, Result, RunId,
};
use tracing::{debug, info, info_span, warn, Instrument};

use super::events::{EventSink, PhotoEvent, ProcessingContext};
use super::fetcher::PageFetcher;
use super::request::PageRequestProvider;
use super::stats::{RunFailure, RunReport, RunStats, RunStatus, StopReason};
use crate::cache::ResponseCache;
use crate::config::RunConfig;
use crate::enrichment::{extras_for, EnrichedPhoto, EnrichmentPolicy};
use crate::source::{CollectionInfo, PhotoSource};

/// Per-run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub page_size: u32,
    pub detail_level: DetailLevel,
    /// First page to fetch (1-based).
    pub start_page: u32,
    /// Stop after this many processed photos.
    pub limit: Option<u64>,
    /// Build events but don't dispatch them.
    pub dry_run: bool,
    /// Overrides the run mode's default enrichment failure policy.
    pub failure_policy: Option<FailurePolicy>,
    /// Labels copied into every event's context.
    pub tags: BTreeMap<String, String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&RunConfig::default())
    }
}

impl RunOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            page_size: config.page_size,
            detail_level: config.detail_level,
            start_page: config.start_page.max(1),
            limit: config.limit,
            dry_run: config.dry_run,
            failure_policy: config.on_enrichment_error,
            tags: BTreeMap::new(),
        }
    }
}

/// Drives one run at a time over a [`PageRequestProvider`].
pub struct PipelineDriver {
    fetcher: PageFetcher,
    enrichment: EnrichmentPolicy,
    sink: EventSink,
    options: RunOptions,
}

impl PipelineDriver {
    pub fn new(
        source: Arc<dyn PhotoSource>,
        cache: ResponseCache,
        sink: EventSink,
        options: RunOptions,
    ) -> Self {
        Self {
            fetcher: PageFetcher::new(Arc::clone(&source), cache.clone()),
            enrichment: EnrichmentPolicy::new(source, cache),
            sink,
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Execute a run.
    ///
    /// # Errors
    ///
    /// A [`RunFailure`] carrying the counters reached before the error.
    pub async fn run(
        &self,
        provider: &dyn PageRequestProvider,
    ) -> std::result::Result<RunReport, RunFailure> {
        let run_id = RunId::new();
        let span = info_span!("run", run_id = %run_id, mode = %provider.mode());
        self.execute(run_id, provider).instrument(span).await
    }

    async fn execute(
        &self,
        run_id: RunId,
        provider: &dyn PageRequestProvider,
    ) -> std::result::Result<RunReport, RunFailure> {
        let mode = provider.mode();
        let options = &self.options;
        let policy = options
            .failure_policy
            .unwrap_or_else(|| mode.default_failure_policy());
        let extras: Vec<String> = extras_for(options.detail_level)
            .into_iter()
            .map(String::from)
            .collect();

        let mut stats = RunStats::default();
        let mut last_page = None;
        let report = |status: RunStatus, stats: RunStats, last_page: Option<u32>| RunReport {
            run_id,
            mode,
            status,
            stats,
            last_page,
        };

        let collection = self
            .fetcher
            .collection_info(provider.target())
            .await
            .map_err(|error| RunFailure::new(error, stats))?;

        info!(
            title = %collection.title,
            detail = %options.detail_level,
            start_page = options.start_page,
            dry_run = options.dry_run,
            on_error = %policy,
            "run started"
        );

        let mut page_number = options.start_page;
        let mut ordinal: u64 = 0;

        let status = 'pages: loop {
            let request = provider.request(page_number, options.page_size, &extras);
            let page = self
                .fetcher
                .fetch(&request)
                .await
                .map_err(|error| RunFailure::new(error, stats))?;

            stats.pages_visited += 1;
            stats.total_reported = page.total_records;
            last_page = Some(page_number);

            if page.records.is_empty() {
                info!(page = page_number, "empty page, ending run");
                break RunStatus::Exhausted;
            }

            let is_last = page.is_last();
            for record in page.records {
                ordinal += 1;

                let (owner, photo) = match self.enrich(provider, record).await {
                    Ok(enriched) => enriched,
                    Err(error) => match policy {
                        FailurePolicy::Abort => return Err(RunFailure::new(error, stats)),
                        FailurePolicy::Skip => {
                            warn!(ordinal, error = %error, "skipping photo");
                            stats.skipped += 1;
                            continue;
                        }
                    },
                };

                let event = PhotoEvent {
                    run_id,
                    collection_id: provider.target().collection_id().cloned(),
                    owner,
                    photo,
                    collection: collection.clone(),
                    context: ProcessingContext {
                        page: page_number,
                        ordinal,
                        total_reported: page.total_records,
                        detail_level: options.detail_level,
                        tags: options.tags.clone(),
                    },
                };
                stats.processed += 1;

                if options.dry_run {
                    debug!(ordinal, photo_id = %event.photo.id(), "dry run, not dispatching");
                } else {
                    let outcome = self.sink.dispatch(&event);
                    stats.events_dispatched += 1;
                    if outcome.stop_requested {
                        let name = outcome.stopped_by.unwrap_or_default();
                        info!(ordinal, subscriber = %name, "subscriber requested stop");
                        break 'pages RunStatus::Stopped(StopReason::Subscriber { name });
                    }
                }

                if let Some(limit) = options.limit {
                    if stats.processed >= limit {
                        info!(limit, "photo limit reached");
                        break 'pages RunStatus::Stopped(StopReason::Limit { limit });
                    }
                }
            }

            if is_last {
                break RunStatus::Exhausted;
            }
            page_number += 1;
        };

        info!(status = %status, stats = %stats, "run finished");
        Ok(report(status, stats, last_page))
    }

    async fn enrich(
        &self,
        provider: &dyn PageRequestProvider,
        record: PhotoRecord,
    ) -> Result<(OwnerId, EnrichedPhoto)> {
        let owner = provider.owner_for(&record).ok_or_else(|| {
            let id = record.text("id").unwrap_or_else(|| "<unknown>".into());
            Error::enrichment(id, "record has no owner")
        })?;
        let photo = self
            .enrichment
            .enrich(self.options.detail_level, record, &owner)
            .await?;
        Ok((owner, photo))
    }

    /// Description the run will attach to events, without walking pages.
    pub async fn describe(&self, provider: &dyn PageRequestProvider) -> Result<CollectionInfo> {
        self.fetcher.collection_info(provider.target()).await
    }
}
