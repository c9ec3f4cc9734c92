//! Regional Controller API client.
//!
//! Provides an asynchronous, session-token based client for the Akraino
//! Regional Controller REST API, per-resource convenience methods, pod event
//! models and a reporter for workflow progress events.

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod reporter;
mod resources;

pub use client::{OperationOutcome, RcClient, RcClientBuilder};
pub use models::{EventLevel, PodEvent, PodEventList, PodEventRecord, PodState};
pub use reporter::{PodEventSink, WorkflowReporter};

/// Convenient result alias that reuses the shared controller error type.
pub type Result<T> = arc_core::Result<T>;
