//! Reading-shelf section: books finished this month.

use chrono::NaiveDate;
use scraper::{Html, Selector};

use recap_shared::{BooksConfig, RecapError, Result, TimeWindow};

use crate::format::{bullet_list, count_noun, rating_marker};
use crate::source::{Payload, PayloadFormat, RetrievalSpec, Source};

/// Scrapes the finished-books shelf and renders the `books` section.
pub struct BookShelf {
    url: String,
}

struct BookEntry {
    title: String,
    author: String,
    rating: Option<f64>,
}

impl BookEntry {
    fn line(&self) -> String {
        format!(
            "_{}_ by {} — {}",
            self.title,
            self.author,
            rating_marker(self.rating)
        )
    }
}

impl BookShelf {
    pub fn from_config(config: &BooksConfig) -> Self {
        Self {
            url: config.url.clone(),
        }
    }

    fn extract_entries(doc: &Html, window: &TimeWindow) -> Result<Vec<BookEntry>> {
        let row_sel = Selector::parse(".review").unwrap();
        let date_sel = Selector::parse(".date_added span").unwrap();
        let title_sel = Selector::parse(".title .value a").unwrap();
        let author_sel = Selector::parse(".author .value a").unwrap();
        let rating_sel = Selector::parse(".rating .value").unwrap();

        let mut entries = Vec::new();
        for row in doc.select(&row_sel) {
            let date_text = row
                .select(&date_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .ok_or_else(|| RecapError::shape("shelf row without a date-added cell"))?;

            // Shelf dates look like "Aug 03, 2026".
            let added = NaiveDate::parse_from_str(&date_text, "%b %d, %Y")
                .map_err(|e| RecapError::date(format!("shelf date '{date_text}': {e}")))?;
            if !window.contains(added) {
                continue;
            }

            let title = row
                .select(&title_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .ok_or_else(|| RecapError::shape("shelf row without a title"))?;
            let author = row
                .select(&author_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .ok_or_else(|| RecapError::shape("shelf row without an author"))?;
            let rating = row
                .select(&rating_sel)
                .next()
                .and_then(|el| el.text().collect::<String>().trim().parse::<f64>().ok());

            entries.push(BookEntry {
                title,
                author,
                rating,
            });
        }

        Ok(entries)
    }
}

impl Source for BookShelf {
    fn name(&self) -> &'static str {
        "books"
    }

    fn request(&self, _window: &TimeWindow) -> Result<RetrievalSpec> {
        Ok(RetrievalSpec::get(&self.url, PayloadFormat::Markup))
    }

    fn render(&self, payload: &Payload, window: &TimeWindow) -> Result<String> {
        let doc = payload.markup()?;
        let entries = Self::extract_entries(doc, window)?;

        if entries.is_empty() {
            return Ok("I didn't finish any books this month!".to_string());
        }

        let lines: Vec<String> = entries.iter().map(BookEntry::line).collect();
        Ok(format!(
            "## books\n\nThis month, I finished {}:\n\n{}",
            count_noun(lines.len(), "book", "books"),
            bullet_list(&lines)
        ))
    }

    fn failure_line(&self) -> String {
        "I couldn't reach my bookshelf this month.".to_string()
    }
}
