//! Fan-out/fan-in aggregation over the source registry.
//!
//! Every source's retrieval-then-render sequence runs concurrently; the
//! join waits for all of them regardless of individual failure, then the
//! fragments are concatenated into the digest in registry order.

use std::sync::Arc;

use reqwest::Client;
use tracing::{info, instrument, warn};

use recap_shared::{AppConfig, FailurePolicy, RecapError, Result, TimeWindow};
use recap_sources::{Source, SourceRegistry};

use crate::fetch::{build_client, retrieve};

// ---------------------------------------------------------------------------
// SectionReport
// ---------------------------------------------------------------------------

/// Outcome of one source's retrieval-then-render sequence.
///
/// The explicit `Ok`/`Err` split lets the join logic and tests distinguish
/// "degraded" from "succeeded" deterministically.
#[derive(Debug)]
pub struct SectionReport {
    /// Source name, for logs and tests.
    pub source: &'static str,
    /// The rendered fragment, or why this slot degraded.
    pub outcome: Result<String>,
    /// Fixed sentence standing in for a failed slot.
    pub fallback: String,
}

impl SectionReport {
    /// Whether this source's section degraded.
    pub fn is_degraded(&self) -> bool {
        self.outcome.is_err()
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

async fn run_source(source: &dyn Source, window: &TimeWindow, client: &Client) -> Result<String> {
    let spec = source.request(window)?;
    let payload = retrieve(client, &spec).await?;
    source.render(&payload, window)
}

/// Run every source concurrently and collect the reports in registry order.
///
/// All retrievals are launched together; the join waits for every one to
/// settle. A failing source never aborts the others.
pub async fn collect(
    registry: &SourceRegistry,
    window: TimeWindow,
    client: &Client,
) -> Vec<SectionReport> {
    let mut tasks = Vec::with_capacity(registry.len());
    for source in registry.iter() {
        let name = source.name();
        let fallback = source.failure_line();
        let source = Arc::clone(source);
        let client = client.clone();
        let handle =
            tokio::spawn(async move { run_source(source.as_ref(), &window, &client).await });
        tasks.push((name, fallback, handle));
    }

    let mut reports = Vec::with_capacity(tasks.len());
    for (name, fallback, handle) in tasks {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(RecapError::Network(format!("{name} task failed: {e}"))),
        };
        if let Err(e) = &outcome {
            warn!(source = name, error = %e, "source degraded");
        }
        reports.push(SectionReport {
            source: name,
            outcome,
            fallback,
        });
    }

    reports
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Join the section fragments into the final digest, blank-line separated.
///
/// A failed slot becomes its fixed failure sentence, or disappears entirely
/// under [`FailurePolicy::Drop`].
pub fn render_digest(reports: &[SectionReport], policy: FailurePolicy) -> String {
    let mut fragments = Vec::with_capacity(reports.len());
    for report in reports {
        match &report.outcome {
            Ok(fragment) if !fragment.is_empty() => fragments.push(fragment.as_str()),
            Ok(_) => {}
            Err(_) => match policy {
                FailurePolicy::ErrorSentence => fragments.push(report.fallback.as_str()),
                FailurePolicy::Drop => {}
            },
        }
    }
    fragments.join("\n\n")
}

/// One-call digest run: build the client and registry, collect, render.
#[instrument(skip_all, fields(window = %window))]
pub async fn run(config: &AppConfig, window: TimeWindow, policy: FailurePolicy) -> Result<String> {
    let client = build_client()?;
    let registry = SourceRegistry::from_config(config);

    info!(sources = registry.len(), "collecting sections");
    let reports = collect(&registry, window, &client).await;

    let degraded = reports.iter().filter(|r| r.is_degraded()).count();
    if degraded > 0 {
        info!(degraded, "digest degraded");
    }

    Ok(render_digest(&reports, policy))
}


#[cfg(test)]
mod e2e {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WINDOW: TimeWindow = TimeWindow {
        year: 2026,
        month: 8,
    };

    const FILMS_PAGE: &str = r#"<html><body><table>
        <tr class="diary-entry-row">
            <td class="diary-day"><a href="/tjwds/films/diary/for/2026/08/"></a></td>
            <td><h3 class="headline-3">First Film</h3></td>
            <td class="td-rating"><input class="rateit-field" value="8"></td>
            <td class="td-rewatch icon-status-off"></td>
        </tr>
        <tr class="diary-entry-row">
            <td class="diary-day"><a href="/tjwds/films/diary/for/2026/08/"></a></td>
            <td><h3 class="headline-3">Second Film</h3></td>
            <td class="td-rating"><input class="rateit-field" value="7"></td>
            <td class="td-rewatch icon-status-off"></td>
        </tr>
        <tr class="diary-entry-row">
            <td class="diary-day"><a href="/tjwds/films/diary/for/2026/07/"></a></td>
            <td><h3 class="headline-3">July Film</h3></td>
            <td class="td-rating"><input class="rateit-field" value="6"></td>
            <td class="td-rewatch icon-status-off"></td>
        </tr>
    </table></body></html>"#;

    const BOOKS_PAGE: &str = r#"<html><body><table>
        <tr class="review">
            <td class="title"><div class="value"><a href="/book/1">A Good Book</a></div></td>
            <td class="author"><div class="value"><a href="/author/1">An Author</a></div></td>
            <td class="rating"><span class="value">4</span></td>
            <td class="date_added"><span>Aug 10, 2026</span></td>
        </tr>
    </table></body></html>"#;

    const ESSAYS_PAGE: &str = r#"<html><body>
        <div class="node-teaser">
            <h2><a href="/essay/one">An Essay</a></h2>
            <span class="submitted">Submitted by ed. on August 5, 2026</span>
            <div class="field-name-field-author">E. Writer</div>
        </div>
    </body></html>"#;

    const WRITING_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>stray writing</title>
    <link>https://blog.example.com/</link>
    <item><title>A Post</title><link>https://blog.example.com/a-post</link><pubDate>Sat, 15 Aug 2026 09:30:00 +0000</pubDate></item>
  </channel>
</rss>"#;

    const STATS_BODY: &str =
        r#"{"data": [{"clicks": {"sort": "2000"}, "keys": {"sort": "40000"}}]}"#;

    const NOTES_BODY: &str = r#"{"data": {"notes": [{"text": "a thought", "url": null}]}}"#;

    /// Config with every source pointed at the mock server.
    fn test_config(server: &MockServer) -> AppConfig {
        let mut config = AppConfig::default();
        config.sources.films.url = format!("{}/films", server.uri());
        config.sources.books.url = format!("{}/books", server.uri());
        config.sources.essays.url = format!("{}/essays", server.uri());
        config.sources.writing.feed_url = format!("{}/feed.xml", server.uri());
        config.sources.stats.url = format!("{}/stats", server.uri());
        config.sources.notes.url = format!("{}/graphql", server.uri());
        // PATH is always present; the token's value is irrelevant to the mock.
        config.sources.notes.token_env = "PATH".to_string();
        config
    }

    async fn mount_page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn mount_all_healthy(server: &MockServer) {
        mount_page(server, "/films", FILMS_PAGE).await;
        mount_page(server, "/books", BOOKS_PAGE).await;
        mount_page(server, "/essays", ESSAYS_PAGE).await;
        mount_page(server, "/feed.xml", WRITING_FEED).await;
        mount_page(server, "/stats", STATS_BODY).await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NOTES_BODY))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn full_digest_covers_every_section_in_order() {
        let server = MockServer::start().await;
        mount_all_healthy(&server).await;
        let config = test_config(&server);

        let digest = run(&config, WINDOW, FailurePolicy::ErrorSentence)
            .await
            .unwrap();

        assert!(digest.contains("## films"));
        assert!(digest.contains("I watched 2 films"));
        assert!(digest.contains("First Film"));
        assert!(!digest.contains("July Film"));
        assert!(digest.contains("I finished 1 book:"));
        assert!(digest.contains("## _failbetter_"));
        assert!(digest.contains("[A Post](https://blog.example.com/a-post)"));
        assert!(digest.contains("I typed 40000 keys and clicked 2000 times."));
        assert!(digest.contains("a thought"));

        // Sections appear in registry order, blank-line separated.
        let films = digest.find("## films").unwrap();
        let books = digest.find("## books").unwrap();
        let stats = digest.find("## stats").unwrap();
        assert!(films < books && books < stats);
        assert!(!digest.contains("\n\n\n"));
    }

    #[tokio::test]
    async fn empty_source_renders_fixed_sentence_without_heading() {
        let server = MockServer::start().await;
        mount_all_healthy(&server).await;
        let mut config = test_config(&server);

        // A diary whose only entry is outside the window.
        mount_page(&server, "/films-empty", r#"<html><body><table>
            <tr class="diary-entry-row">
                <td class="diary-day"><a href="/tjwds/films/diary/for/2026/07/"></a></td>
                <td><h3 class="headline-3">July Film</h3></td>
                <td class="td-rating"></td>
                <td class="td-rewatch icon-status-off"></td>
            </tr>
        </table></body></html>"#)
            .await;
        config.sources.films.url = format!("{}/films-empty", server.uri());

        let digest = run(&config, WINDOW, FailurePolicy::ErrorSentence)
            .await
            .unwrap();

        assert!(digest.contains("I didn't watch any films this month!"));
        assert!(!digest.contains("## films"));
    }

    #[tokio::test]
    async fn one_failing_source_degrades_only_its_own_slot() {
        let server = MockServer::start().await;
        mount_page(&server, "/films", FILMS_PAGE).await;
        Mock::given(method("GET"))
            .and(path("/books"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/essays", ESSAYS_PAGE).await;
        mount_page(&server, "/feed.xml", WRITING_FEED).await;
        mount_page(&server, "/stats", STATS_BODY).await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NOTES_BODY))
            .mount(&server)
            .await;

        let config = test_config(&server);
        let registry = SourceRegistry::from_config(&config);
        let client = build_client().unwrap();

        let reports = collect(&registry, WINDOW, &client).await;
        let degraded: Vec<&str> = reports
            .iter()
            .filter(|r| r.is_degraded())
            .map(|r| r.source)
            .collect();
        assert_eq!(degraded, vec!["books"]);

        let digest = render_digest(&reports, FailurePolicy::ErrorSentence);
        assert!(digest.contains("## films"));
        assert!(digest.contains("I couldn't reach my bookshelf this month."));
        assert!(digest.contains("## stats"));

        let dropped = render_digest(&reports, FailurePolicy::Drop);
        assert!(!dropped.contains("bookshelf"));
        assert!(dropped.contains("## films"));
    }

    #[tokio::test]
    async fn identical_payloads_yield_byte_identical_digests() {
        let server = MockServer::start().await;
        mount_all_healthy(&server).await;
        let config = test_config(&server);

        let first = run(&config, WINDOW, FailurePolicy::ErrorSentence)
            .await
            .unwrap();
        let second = run(&config, WINDOW, FailurePolicy::ErrorSentence)
            .await
            .unwrap();

        assert_eq!(first, second);
    }
}
