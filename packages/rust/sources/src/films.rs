//! Film-diary section: films watched this month.

use scraper::{Html, Selector};

use recap_shared::{FilmsConfig, RecapError, Result, TimeWindow};

use crate::format::{bullet_list, count_noun, rating_marker};
use crate::source::{Payload, PayloadFormat, RetrievalSpec, Source};

/// Scrapes the film-diary page and renders the `films` section.
pub struct FilmDiary {
    url: String,
    reverse: bool,
}

struct FilmEntry {
    title: String,
    rewatch: bool,
    /// Rating in stars (0–5, half-star granularity).
    rating: Option<f64>,
}

impl FilmEntry {
    fn line(&self) -> String {
        let rewatch = if self.rewatch { " (rewatch)" } else { "" };
        format!("{} — {}{rewatch}", self.title, rating_marker(self.rating))
    }
}

impl FilmDiary {
    pub fn from_config(config: &FilmsConfig) -> Self {
        Self {
            url: config.url.clone(),
            reverse: config.reverse,
        }
    }

    fn extract_entries(doc: &Html, window: &TimeWindow) -> Result<Vec<FilmEntry>> {
        let row_sel = Selector::parse(".diary-entry-row").unwrap();
        let day_sel = Selector::parse(".diary-day a").unwrap();
        let title_sel = Selector::parse(".headline-3").unwrap();
        let seen_sel = Selector::parse(".td-rewatch.icon-status-off").unwrap();
        let rating_sel = Selector::parse(".td-rating input.rateit-field").unwrap();

        // The diary-day link href embeds the entry's year/month.
        let year_month = format!("{}/{:02}", window.year, window.month);

        let mut entries = Vec::new();
        for row in doc.select(&row_sel) {
            let in_window = row
                .select(&day_sel)
                .next()
                .and_then(|link| link.value().attr("href"))
                .is_some_and(|href| href.contains(&year_month));
            if !in_window {
                continue;
            }

            let title = row
                .select(&title_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .ok_or_else(|| RecapError::shape("diary row without a title"))?;

            // The status-off icon marks a first watch.
            let rewatch = row.select(&seen_sel).next().is_none();

            // Hidden rating input carries half-star units (0–10).
            let rating = row
                .select(&rating_sel)
                .next()
                .and_then(|el| el.value().attr("value"))
                .and_then(|value| value.parse::<f64>().ok())
                .map(|half_stars| half_stars / 2.0);

            entries.push(FilmEntry {
                title,
                rewatch,
                rating,
            });
        }

        Ok(entries)
    }
}

impl Source for FilmDiary {
    fn name(&self) -> &'static str {
        "films"
    }

    fn request(&self, _window: &TimeWindow) -> Result<RetrievalSpec> {
        Ok(RetrievalSpec::get(&self.url, PayloadFormat::Markup))
    }

    fn render(&self, payload: &Payload, window: &TimeWindow) -> Result<String> {
        let doc = payload.markup()?;
        let mut entries = Self::extract_entries(doc, window)?;
        if self.reverse {
            entries.reverse();
        }

        if entries.is_empty() {
            return Ok("I didn't watch any films this month!".to_string());
        }

        let lines: Vec<String> = entries.iter().map(FilmEntry::line).collect();
        Ok(format!(
            "## films\n\nThis month, I watched {}:\n\n{}",
            count_noun(lines.len(), "film", "films"),
            bullet_list(&lines)
        ))
    }

    fn failure_line(&self) -> String {
        "I couldn't reach my film diary this month.".to_string()
    }
}
