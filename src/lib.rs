//! Photoreel - Paginated photo import pipeline
//!
//! This library crate exposes the pipeline for the `photoreel` binary and for
//! integration testing.

pub mod cache;
pub mod config;
pub mod enrichment;
pub mod pipeline;
pub mod reference;
pub mod source;
pub mod subscribers;
