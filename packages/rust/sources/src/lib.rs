//! Source registry and per-source section renderers.
//!
//! This crate provides:
//! - [`Source`] — the per-source contract (build a request, render a section)
//! - [`SourceRegistry`] — the ordered collection the aggregator fans out over
//! - One module per digest section (films, books, essays, writing, stats, notes)

pub mod format;
pub mod source;

mod books;
mod essays;
mod films;
mod notes;
mod stats;
mod writing;

pub use books::BookShelf;
pub use essays::MagazineFront;
pub use films::FilmDiary;
pub use notes::NoteStream;
pub use source::{Method, Payload, PayloadFormat, RetrievalSpec, Source, SourceRegistry};
pub use stats::PulseStats;
pub use writing::WritingFeed;
