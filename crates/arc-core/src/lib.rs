//! # arc-core
//!
//! Core types and utilities for working with an Akraino Regional Controller (ARC).
//!
//! This crate provides the error taxonomy, client configuration, and the resource
//! vocabulary shared by Regional Controller API clients.
//!
//! ## Modules
//!
//! - [`error`] - Error types for transport, authentication and capability failures
//! - [`types`] - Resource types, verbs, capability table and media types
//! - [`config`] - Configuration structures for controller clients
//! - [`client`] - Wire constants and HTTP client settings

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Endpoint, RcClientConfig};
pub use error::{Error, Result};
pub use types::{AcceptPreference, CapabilitySet, MediaType, ResourceType, Scheme, Verb};
