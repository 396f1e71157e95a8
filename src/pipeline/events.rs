//! Photo events and their synchronous dispatch.
//!
//! Subscribers see each [`PhotoEvent`] by shared reference and answer with a
//! [`Flow`]. The stop decision travels back through the return value of
//! [`EventSink::dispatch`]; the event itself is never mutated.

use std::collections::BTreeMap;
use std::sync::Arc;

use photoreel_common::{CollectionId, DetailLevel, OwnerId, RunId};
use serde::Serialize;
use tracing::debug;

use crate::enrichment::EnrichedPhoto;
use crate::source::CollectionInfo;

/// Where in the run an event was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingContext {
    /// Page the photo came from.
    pub page: u32,
    /// 1-based position in the run's traversal order. Never reset per page.
    pub ordinal: u64,
    /// Total number of photos the source reported for the run.
    pub total_reported: u64,
    pub detail_level: DetailLevel,
    /// Job-specific labels supplied by the caller.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// One enriched photo, handed to every subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoEvent {
    pub run_id: RunId,
    /// Album id; absent for search runs.
    pub collection_id: Option<CollectionId>,
    pub owner: OwnerId,
    pub photo: EnrichedPhoto,
    pub collection: CollectionInfo,
    pub context: ProcessingContext,
}

/// A subscriber's answer to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// End the run once every subscriber has seen this event.
    Stop,
}

/// Consumer of photo events.
///
/// Called synchronously, in registration order, once per photo.
pub trait Subscriber: Send + Sync {
    /// Name used in logs and stop reports.
    fn name(&self) -> &str;

    fn on_photo(&self, event: &PhotoEvent) -> Flow;
}

/// Result of dispatching one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub stop_requested: bool,
    /// The first subscriber that asked to stop.
    pub stopped_by: Option<String>,
}

/// Ordered list of subscribers.
#[derive(Clone, Default)]
pub struct EventSink {
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber. It runs after every subscriber added before it.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber>) {
        debug!(subscriber = subscriber.name(), "subscriber registered");
        self.subscribers.push(subscriber);
    }

    /// Builder-style [`subscribe`](Self::subscribe).
    pub fn with(mut self, subscriber: Arc<dyn Subscriber>) -> Self {
        self.subscribe(subscriber);
        self
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Hand `event` to every subscriber in order.
    ///
    /// A stop request does not short-circuit: subscribers after the one that
    /// asked to stop still see this event.
    pub fn dispatch(&self, event: &PhotoEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        for subscriber in &self.subscribers {
            if subscriber.on_photo(event) == Flow::Stop {
                debug!(
                    subscriber = subscriber.name(),
                    photo_id = %event.photo.id(),
                    "stop requested"
                );
                outcome.stop_requested = true;
                outcome
                    .stopped_by
                    .get_or_insert_with(|| subscriber.name().to_string());
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records the order it was called in and answers with a fixed flow.
    struct Probe {
        name: &'static str,
        flow: Flow,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Subscriber for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn on_photo(&self, _event: &PhotoEvent) -> Flow {
            self.log.lock().push(self.name);
            self.flow
        }
    }

    fn event() -> PhotoEvent {
        let record = serde_json::from_value(serde_json::json!({"id": "1"})).unwrap();
        PhotoEvent {
            run_id: RunId::new(),
            collection_id: None,
            owner: OwnerId::new("12@N01").unwrap(),
            photo: EnrichedPhoto::from_list(record).unwrap(),
            collection: CollectionInfo::default(),
            context: ProcessingContext {
                page: 1,
                ordinal: 1,
                total_reported: 1,
                detail_level: DetailLevel::Basic,
                tags: BTreeMap::new(),
            },
        }
    }

    fn sink(flows: &[(&'static str, Flow)], log: &Arc<Mutex<Vec<&'static str>>>) -> EventSink {
        flows.iter().fold(EventSink::new(), |sink, &(name, flow)| {
            sink.with(Arc::new(Probe {
                name,
                flow,
                log: Arc::clone(log),
            }))
        })
    }

    #[test]
    fn all_subscribers_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = sink(
            &[("a", Flow::Continue), ("b", Flow::Continue), ("c", Flow::Continue)],
            &log,
        );

        let outcome = sink.dispatch(&event());
        assert_eq!(outcome, DispatchOutcome::default());
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn stop_lets_later_subscribers_finish() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = sink(
            &[("a", Flow::Continue), ("b", Flow::Stop), ("c", Flow::Stop)],
            &log,
        );

        let outcome = sink.dispatch(&event());
        assert!(outcome.stop_requested);
        assert_eq!(outcome.stopped_by.as_deref(), Some("b"));
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_sink_never_stops() {
        let sink = EventSink::new();
        assert!(sink.is_empty());
        assert!(!sink.dispatch(&event()).stop_requested);
    }

    #[test]
    fn context_serializes_without_empty_tags() {
        let json = serde_json::to_value(&event().context).unwrap();
        assert!(json.get("tags").is_none());
        assert_eq!(json["detail_level"], "basic");
    }
}
