//! HTTP client construction and the single retrieval function.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use recap_shared::{RecapError, Result};
use recap_sources::{Method, Payload, PayloadFormat, RetrievalSpec};

/// User-Agent string for digest requests.
const USER_AGENT: &str = concat!("recap/", env!("CARGO_PKG_VERSION"));

/// Per-source timeout; a hung call becomes that source's failure marker
/// instead of stalling the whole join.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client used for every retrieval in a run.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| RecapError::Network(format!("failed to build HTTP client: {e}")))
}

/// Issue one retrieval and decode the body per the request's format tag.
pub async fn retrieve(client: &Client, spec: &RetrievalSpec) -> Result<Payload> {
    debug!(url = %spec.url, method = ?spec.method, "fetching source");

    let mut request = match spec.method {
        Method::Get => client.get(&spec.url),
        Method::Post => client.post(&spec.url),
    };
    for (name, value) in &spec.headers {
        request = request.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &spec.body {
        request = request
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.clone());
    }

    let response = request
        .send()
        .await
        .map_err(|e| RecapError::Network(format!("{}: {e}", spec.url)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RecapError::Network(format!("{}: HTTP {status}", spec.url)));
    }

    let body = response
        .text()
        .await
        .map_err(|e| RecapError::Network(format!("{}: body read failed: {e}", spec.url)))?;

    Ok(match spec.format {
        PayloadFormat::Markup => Payload::Markup(scraper::Html::parse_document(&body)),
        PayloadFormat::Json => Payload::Json(
            serde_json::from_str(&body)
                .map_err(|e| RecapError::shape(format!("{}: body is not JSON: {e}", spec.url)))?,
        ),
        PayloadFormat::Xml => Payload::Xml(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_decodes_json_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": []}"#))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let spec = RetrievalSpec::get(format!("{}/stats", server.uri()), PayloadFormat::Json);
        let payload = retrieve(&client, &spec).await.unwrap();

        assert!(payload.json().unwrap().get("data").is_some());
    }

    #[tokio::test]
    async fn post_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer sekrit"))
            .and(body_string_contains("createdAfter"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"data": {"notes": []}}"#),
            )
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let spec = RetrievalSpec::post_json(
            format!("{}/graphql", server.uri()),
            vec![("Authorization".to_string(), "Bearer sekrit".to_string())],
            r#"{"query": "query { notes(createdAfter: \"2026-08-01\") { text } }"}"#.to_string(),
        );
        let payload = retrieve(&client, &spec).await.unwrap();

        assert!(payload.json().is_ok());
    }

    #[tokio::test]
    async fn http_error_status_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let spec = RetrievalSpec::get(format!("{}/down", server.uri()), PayloadFormat::Markup);
        let err = retrieve(&client, &spec).await.unwrap_err();

        assert!(matches!(err, RecapError::Network(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn non_json_body_for_json_format_is_a_shape_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let spec = RetrievalSpec::get(format!("{}/broken", server.uri()), PayloadFormat::Json);
        let err = retrieve(&client, &spec).await.unwrap_err();

        assert!(matches!(err, RecapError::Shape { .. }));
    }
}
