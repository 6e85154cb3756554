//! The per-source contract and the registry the aggregator fans out over.

use std::sync::Arc;

use recap_shared::{AppConfig, RecapError, Result, TimeWindow};

use crate::books::BookShelf;
use crate::essays::MagazineFront;
use crate::films::FilmDiary;
use crate::notes::NoteStream;
use crate::stats::PulseStats;
use crate::writing::WritingFeed;

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// HTTP method for a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// How a fetched body is decoded before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// HTML, parsed into a CSS-selector-queryable document.
    Markup,
    /// JSON, decoded into a structured value.
    Json,
    /// XML, kept as text for the owning source to deserialize.
    Xml,
}

/// A fully-described outbound request for one source.
///
/// Every source produces this one tagged shape, and the aggregator's single
/// retrieval function matches on `method`/`format` — no optional-field
/// probing per source kind.
#[derive(Debug, Clone)]
pub struct RetrievalSpec {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub format: PayloadFormat,
}

impl RetrievalSpec {
    /// A plain GET of the given format.
    pub fn get(url: impl Into<String>, format: PayloadFormat) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            body: None,
            format,
        }
    }

    /// A POST with a JSON body, expecting a JSON response.
    pub fn post_json(
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: String,
    ) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            headers,
            body: Some(body),
            format: PayloadFormat::Json,
        }
    }
}

/// A retrieved payload, decoded per the request's format tag.
///
/// Owned by the render invocation that consumes it; discarded after use.
#[derive(Debug)]
pub enum Payload {
    /// Parsed HTML document.
    Markup(scraper::Html),
    /// Decoded JSON value.
    Json(serde_json::Value),
    /// Raw XML text; feed sources deserialize it themselves.
    Xml(String),
}

impl Payload {
    /// The parsed HTML document, or a payload-shape error.
    pub fn markup(&self) -> Result<&scraper::Html> {
        match self {
            Payload::Markup(doc) => Ok(doc),
            _ => Err(RecapError::shape("expected an HTML payload")),
        }
    }

    /// The decoded JSON value, or a payload-shape error.
    pub fn json(&self) -> Result<&serde_json::Value> {
        match self {
            Payload::Json(value) => Ok(value),
            _ => Err(RecapError::shape("expected a JSON payload")),
        }
    }

    /// The raw XML text, or a payload-shape error.
    pub fn xml(&self) -> Result<&str> {
        match self {
            Payload::Xml(text) => Ok(text),
            _ => Err(RecapError::shape("expected an XML payload")),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One external page/feed/API contributing one section of the digest.
///
/// `render` is a pure function of the payload plus the injected window, so
/// sections can be computed independently and in any order. No source may
/// depend on another source's output.
pub trait Source: Send + Sync {
    /// Stable identifier for logs and section slots.
    fn name(&self) -> &'static str;

    /// Build the outbound request for this run's window. May embed
    /// window-derived date strings; a failure here (e.g. a missing
    /// credential) degrades this source only.
    fn request(&self, window: &TimeWindow) -> Result<RetrievalSpec>;

    /// Turn the retrieved payload into this source's section fragment.
    /// Zero surviving entries still produce the source's fixed
    /// "nothing happened" sentence, never an empty string.
    fn render(&self, payload: &Payload, window: &TimeWindow) -> Result<String>;

    /// Fixed sentence standing in for this source's slot when it fails.
    fn failure_line(&self) -> String;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds the configured sources in digest order.
///
/// Adding a source means appending one entry here; nothing else changes.
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Build the registry from config. Order here is output order.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sources: vec![
                Arc::new(FilmDiary::from_config(&config.sources.films)),
                Arc::new(BookShelf::from_config(&config.sources.books)),
                Arc::new(MagazineFront::from_config(&config.sources.essays)),
                Arc::new(WritingFeed::from_config(&config.sources.writing)),
                Arc::new(PulseStats::from_config(&config.sources.stats)),
                Arc::new(NoteStream::from_config(&config.sources.notes)),
            ],
        }
    }

    /// Iterate the sources in digest order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
