//! Concurrent aggregation of source sections into one digest.
//!
//! This crate provides:
//! - [`fetch`] — HTTP client construction and the single retrieval function
//! - [`aggregate`] — fan-out/fan-in over the registry and digest rendering
//! - [`run`] — the one-call entry point used by the CLI

pub mod aggregate;
pub mod fetch;

pub use aggregate::{SectionReport, collect, render_digest, run};
pub use fetch::{build_client, retrieve};
