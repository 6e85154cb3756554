//! Notes section: micro-posts from the notes service's GraphQL endpoint.

use serde::Deserialize;

use recap_shared::{NotesConfig, RecapError, Result, TimeWindow};

use crate::format::{bullet_list, count_noun};
use crate::source::{Payload, RetrievalSpec, Source};

#[derive(Debug, Deserialize)]
struct NotesResponse {
    data: NotesData,
}

#[derive(Debug, Deserialize)]
struct NotesData {
    #[serde(default)]
    notes: Vec<Note>,
}

#[derive(Debug, Deserialize)]
struct Note {
    text: String,
    url: Option<String>,
}

/// Queries the notes service and renders the `notes` section.
pub struct NoteStream {
    url: String,
    token_env: String,
}

impl NoteStream {
    pub fn from_config(config: &NotesConfig) -> Self {
        Self {
            url: config.url.clone(),
            token_env: config.token_env.clone(),
        }
    }

    /// The service filters server-side: the query embeds the first day of
    /// the window, so the response needs no client-side month check.
    fn build_request(&self, window: &TimeWindow, token: &str) -> RetrievalSpec {
        let since = window.first_day().format("%Y-%m-%d");
        let query = format!(r#"query {{ notes(createdAfter: "{since}") {{ text url createdAt }} }}"#);
        let body = serde_json::json!({ "query": query }).to_string();

        RetrievalSpec::post_json(
            &self.url,
            vec![("Authorization".to_string(), format!("Bearer {token}"))],
            body,
        )
    }
}

impl Source for NoteStream {
    fn name(&self) -> &'static str {
        "notes"
    }

    fn request(&self, window: &TimeWindow) -> Result<RetrievalSpec> {
        let token = std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                RecapError::config(format!(
                    "notes token not found. Set the {} environment variable.",
                    self.token_env
                ))
            })?;
        Ok(self.build_request(window, &token))
    }

    fn render(&self, payload: &Payload, _window: &TimeWindow) -> Result<String> {
        let response: NotesResponse = serde_json::from_value(payload.json()?.clone())
            .map_err(|e| RecapError::shape(format!("notes payload: {e}")))?;

        let notes = response.data.notes;
        if notes.is_empty() {
            return Ok("I didn't jot down any notes this month!".to_string());
        }

        let lines: Vec<String> = notes
            .iter()
            .map(|note| match &note.url {
                Some(url) => format!("{} ([link]({url}))", note.text.trim()),
                None => note.text.trim().to_string(),
            })
            .collect();
        Ok(format!(
            "## notes\n\nThis month, I jotted down {}:\n\n{}",
            count_noun(lines.len(), "note", "notes"),
            bullet_list(&lines)
        ))
    }

    fn failure_line(&self) -> String {
        "My notes were unavailable this month.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Method;
    use recap_shared::NotesConfig;

    fn source() -> NoteStream {
        NoteStream::from_config(&NotesConfig {
            url: "https://notes.example.com/graphql".into(),
            token_env: "RECAP_TEST_NONEXISTENT_TOKEN_12345".into(),
        })
    }

    #[test]
    fn request_embeds_first_day_and_bearer_token() {
        let spec = source().build_request(&TimeWindow::new(2026, 8), "sekrit");

        assert_eq!(spec.method, Method::Post);
        let body = spec.body.as_deref().unwrap();
        assert!(body.contains(r#"createdAfter: \"2026-08-01\""#));
        assert!(
            spec.headers
                .contains(&("Authorization".to_string(), "Bearer sekrit".to_string()))
        );
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = source().request(&TimeWindow::new(2026, 8)).unwrap_err();
        assert!(matches!(err, RecapError::Config { .. }));
        assert!(err.to_string().contains("RECAP_TEST_NONEXISTENT_TOKEN_12345"));
    }

    #[test]
    fn renders_notes_with_and_without_links() {
        let window = TimeWindow::new(2026, 8);
        let payload = Payload::Json(serde_json::json!({
            "data": {
                "notes": [
                    {"text": "a thought", "url": "https://notes.example.com/n/1", "createdAt": "2026-08-02"},
                    {"text": "another thought", "url": null, "createdAt": "2026-08-09"}
                ]
            }
        }));

        let section = source().render(&payload, &window).unwrap();
        assert!(section.contains("I jotted down 2 notes"));
        assert!(section.contains("a thought ([link](https://notes.example.com/n/1))"));
        assert!(section.contains("- another thought"));
    }

    #[test]
    fn empty_month_renders_fixed_sentence() {
        let window = TimeWindow::new(2026, 8);
        let payload = Payload::Json(serde_json::json!({ "data": { "notes": [] } }));

        let section = source().render(&payload, &window).unwrap();
        assert_eq!(section, "I didn't jot down any notes this month!");
    }
}
