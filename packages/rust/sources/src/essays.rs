//! Magazine section: pieces the literary magazine published this month.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use recap_shared::{EssaysConfig, RecapError, Result, TimeWindow};

use crate::format::bullet_list;
use crate::source::{Payload, PayloadFormat, RetrievalSpec, Source};

/// Matches the date in a byline like "Submitted by ed. on January 5, 2026".
static BYLINE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"on\s+([A-Za-z]+ \d{1,2}, \d{4})").unwrap());

/// Scrapes the magazine's front page and renders the essays section.
pub struct MagazineFront {
    url: String,
    name: String,
}

struct EssayEntry {
    title: String,
    link: String,
    author: String,
}

impl EssayEntry {
    fn line(&self) -> String {
        format!("[\"{}\"]({}) by {}", self.title, self.link, self.author)
    }
}

impl MagazineFront {
    pub fn from_config(config: &EssaysConfig) -> Self {
        Self {
            url: config.url.clone(),
            name: config.name.clone(),
        }
    }

    fn extract_entries(&self, doc: &Html, window: &TimeWindow) -> Result<Vec<EssayEntry>> {
        let row_sel = Selector::parse(".node-teaser").unwrap();
        let byline_sel = Selector::parse(".submitted").unwrap();
        let link_sel = Selector::parse("h2 a").unwrap();
        let author_sel = Selector::parse(".field-name-field-author").unwrap();

        let base = Url::parse(&self.url)
            .map_err(|e| RecapError::config(format!("essays url '{}': {e}", self.url)))?;

        let mut entries = Vec::new();
        for row in doc.select(&row_sel) {
            // Teasers without a byline (house announcements) are skipped.
            let Some(byline) = row
                .select(&byline_sel)
                .next()
                .map(|el| el.text().collect::<String>())
            else {
                continue;
            };

            let date_text = BYLINE_DATE
                .captures(&byline)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| {
                    RecapError::date(format!("byline without a recognizable date: '{}'", byline.trim()))
                })?;
            let published = NaiveDate::parse_from_str(&date_text, "%B %d, %Y")
                .map_err(|e| RecapError::date(format!("byline date '{date_text}': {e}")))?;
            if !window.contains(published) {
                continue;
            }

            let link_el = row
                .select(&link_sel)
                .next()
                .ok_or_else(|| RecapError::shape("teaser without a title link"))?;
            let title = link_el.text().collect::<String>().trim().to_string();
            let href = link_el
                .value()
                .attr("href")
                .ok_or_else(|| RecapError::shape("teaser title link without an href"))?;
            let link = base
                .join(href)
                .map_err(|e| RecapError::shape(format!("teaser link '{href}': {e}")))?
                .to_string();

            let author = row
                .select(&author_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .ok_or_else(|| RecapError::shape("teaser without an author"))?;

            entries.push(EssayEntry {
                title,
                link,
                author,
            });
        }

        Ok(entries)
    }
}

impl Source for MagazineFront {
    fn name(&self) -> &'static str {
        "essays"
    }

    fn request(&self, _window: &TimeWindow) -> Result<RetrievalSpec> {
        Ok(RetrievalSpec::get(&self.url, PayloadFormat::Markup))
    }

    fn render(&self, payload: &Payload, window: &TimeWindow) -> Result<String> {
        let doc = payload.markup()?;
        let entries = self.extract_entries(doc, window)?;

        if entries.is_empty() {
            return Ok(format!("No new pieces from _{}_ this month.", self.name));
        }

        let lines: Vec<String> = entries.iter().map(EssayEntry::line).collect();
        Ok(format!(
            "## _{}_\n\nThis month, _{}_ published:\n\n{}",
            self.name,
            self.name,
            bullet_list(&lines)
        ))
    }

    fn failure_line(&self) -> String {
        format!("I couldn't check _{}_ this month.", self.name)
    }
}
