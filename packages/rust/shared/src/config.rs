//! Application configuration for recap.
//!
//! User config lives at `~/.recap/recap.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RecapError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "recap.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".recap";

// ---------------------------------------------------------------------------
// Config structs (matching recap.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Digest output behavior.
    #[serde(default)]
    pub output: OutputConfig,

    /// Per-source settings, one section per digest section.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// What to do with a failed source's slot.
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

/// How a failed source appears in the digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep the slot, filled with the source's fixed failure sentence.
    #[default]
    ErrorSentence,
    /// Drop the section entirely.
    Drop,
}

/// `[sources]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub films: FilmsConfig,
    #[serde(default)]
    pub books: BooksConfig,
    #[serde(default)]
    pub essays: EssaysConfig,
    #[serde(default)]
    pub writing: WritingConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

/// `[sources.films]` section — the film-diary page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmsConfig {
    #[serde(default = "default_films_url")]
    pub url: String,

    /// The diary lists newest entries first; reverse so the digest reads
    /// oldest-to-newest.
    #[serde(default = "default_true")]
    pub reverse: bool,
}

impl Default for FilmsConfig {
    fn default() -> Self {
        Self {
            url: default_films_url(),
            reverse: true,
        }
    }
}

fn default_films_url() -> String {
    "https://letterboxd.com/tjwds/films/diary/".into()
}

/// `[sources.books]` section — the finished-books shelf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksConfig {
    #[serde(default = "default_books_url")]
    pub url: String,
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            url: default_books_url(),
        }
    }
}

fn default_books_url() -> String {
    "https://www.goodreads.com/review/list/10363050-joe?shelf=read".into()
}

/// `[sources.essays]` section — the literary magazine's front page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssaysConfig {
    #[serde(default = "default_essays_url")]
    pub url: String,

    /// Display name used in the section heading and sentences.
    #[serde(default = "default_essays_name")]
    pub name: String,
}

impl Default for EssaysConfig {
    fn default() -> Self {
        Self {
            url: default_essays_url(),
            name: default_essays_name(),
        }
    }
}

fn default_essays_url() -> String {
    "https://www.failbetter.com/".into()
}

fn default_essays_name() -> String {
    "failbetter".into()
}

/// `[sources.writing]` section — the personal blog's RSS feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingConfig {
    #[serde(default = "default_writing_feed_url")]
    pub feed_url: String,

    /// Feeds list newest entries first; reverse so the digest reads
    /// oldest-to-newest.
    #[serde(default = "default_true")]
    pub reverse: bool,
}

impl Default for WritingConfig {
    fn default() -> Self {
        Self {
            feed_url: default_writing_feed_url(),
            reverse: true,
        }
    }
}

fn default_writing_feed_url() -> String {
    "https://joewoods.dev/feed.xml".into()
}

/// `[sources.stats]` section — the input-device statistics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Endpoint base URL; the month's date range is appended as query
    /// parameters at request time.
    #[serde(default = "default_stats_url")]
    pub url: String,

    #[serde(default = "default_stats_computer_id")]
    pub computer_id: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            url: default_stats_url(),
            computer_id: default_stats_computer_id(),
        }
    }
}

fn default_stats_url() -> String {
    "https://whatpulse.org/ajax/json/user/pulse/list/132366".into()
}

fn default_stats_computer_id() -> String {
    "1408253".into()
}

/// `[sources.notes]` section — the notes GraphQL endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_notes_url")]
    pub url: String,

    /// Name of the env var holding the bearer token (never store the token
    /// itself).
    #[serde(default = "default_notes_token_env")]
    pub token_env: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            url: default_notes_url(),
            token_env: default_notes_token_env(),
        }
    }
}

fn default_notes_url() -> String {
    "https://notes.joewoods.dev/graphql".into()
}

fn default_notes_token_env() -> String {
    "RECAP_NOTES_TOKEN".into()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.recap/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RecapError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.recap/recap.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RecapError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RecapError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RecapError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| RecapError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RecapError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
