//! Shared types, error model, and configuration for recap.
//!
//! This crate is the foundation depended on by all other recap crates.
//! It provides:
//! - [`RecapError`] — the unified error type
//! - [`TimeWindow`] — the calendar month a digest run covers
//! - Configuration ([`AppConfig`], per-source sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BooksConfig, EssaysConfig, FailurePolicy, FilmsConfig, NotesConfig, OutputConfig,
    SourcesConfig, StatsConfig, WritingConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{RecapError, Result};
pub use types::TimeWindow;
