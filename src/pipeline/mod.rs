//! Paginated fetch, enrich and publish pipeline.
//!
//! # Module layout
//!
//! - [`request`] -- Page requests and the album/search strategies.
//! - [`fetcher`] -- Cached page and collection lookups.
//! - [`events`] -- Photo events, subscribers and dispatch.
//! - [`driver`] -- The run loop.
//! - [`stats`] -- Counters and run outcomes.
//!
//! # Example
//!
//! ```rust,ignore
//! let driver = PipelineDriver::new(source, cache, sink, RunOptions::default());
//! let report = driver.run(&CollectionPages::new(reference)).await?;
//! println!("{}", report.stats);
//! ```

pub mod driver;
pub mod events;
pub mod fetcher;
pub mod request;
pub mod stats;

pub use driver::{PipelineDriver, RunOptions};
pub use events::{DispatchOutcome, EventSink, Flow, PhotoEvent, ProcessingContext, Subscriber};
pub use fetcher::{Page, PageFetcher};
pub use request::{CollectionPages, PageRequest, PageRequestProvider, PageTarget, SearchPages};
pub use stats::{RunFailure, RunReport, RunStats, RunStatus, StopReason};
