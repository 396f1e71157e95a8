//! Built-in event subscribers.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use photoreel_common::PhotoId;
use tracing::{error, info};

use crate::pipeline::{Flow, PhotoEvent, Subscriber};

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

/// Writes every event as one line of JSON.
///
/// A write failure is logged and ends the run, since later events could not
/// be recorded either.
pub struct JsonLinesSubscriber<W> {
    writer: Mutex<W>,
}

impl JsonLinesSubscriber<BufWriter<io::Stdout>> {
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(io::stdout()))
    }
}

impl JsonLinesSubscriber<BufWriter<File>> {
    /// Create (or truncate) `path` and write events to it.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {:?}", path))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSubscriber<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_event(&self, event: &PhotoEvent) -> io::Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl<W: Write + Send> Subscriber for JsonLinesSubscriber<W> {
    fn name(&self) -> &str {
        "json-lines"
    }

    fn on_photo(&self, event: &PhotoEvent) -> Flow {
        match self.write_event(event) {
            Ok(()) => Flow::Continue,
            Err(e) => {
                error!(photo_id = %event.photo.id(), error = %e, "failed to write event");
                Flow::Stop
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logs one line per photo at `info`.
#[derive(Debug, Default)]
pub struct LogSubscriber;

impl Subscriber for LogSubscriber {
    fn name(&self) -> &str {
        "log"
    }

    fn on_photo(&self, event: &PhotoEvent) -> Flow {
        let ctx = &event.context;
        info!(
            ordinal = ctx.ordinal,
            page = ctx.page,
            total = ctx.total_reported,
            photo_id = %event.photo.id(),
            title = event.photo.title().unwrap_or(""),
            "photo"
        );
        Flow::Continue
    }
}

// ---------------------------------------------------------------------------
// Stop at photo
// ---------------------------------------------------------------------------

/// Requests a stop once a given photo has been seen.
#[derive(Debug, Clone)]
pub struct StopAtPhoto {
    photo: PhotoId,
}

impl StopAtPhoto {
    pub fn new(photo: PhotoId) -> Self {
        Self { photo }
    }
}

impl Subscriber for StopAtPhoto {
    fn name(&self) -> &str {
        "stop-at-photo"
    }

    fn on_photo(&self, event: &PhotoEvent) -> Flow {
        if event.photo.id() == &self.photo {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}
