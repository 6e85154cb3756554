//! Stray-writing section: posts from the personal blog's RSS feed.

use chrono::{DateTime, Local};
use serde::Deserialize;

use recap_shared::{RecapError, Result, TimeWindow, WritingConfig};

use crate::format::{bullet_list, count_noun};
use crate::source::{Payload, PayloadFormat, RetrievalSpec, Source};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Reads the blog feed and renders the `writing` section.
pub struct WritingFeed {
    feed_url: String,
    reverse: bool,
}

impl WritingFeed {
    pub fn from_config(config: &WritingConfig) -> Self {
        Self {
            feed_url: config.feed_url.clone(),
            reverse: config.reverse,
        }
    }

    fn extract_lines(xml: &str, window: &TimeWindow) -> Result<Vec<String>> {
        let rss: Rss = quick_xml::de::from_str(xml)
            .map_err(|e| RecapError::shape(format!("feed did not parse as RSS: {e}")))?;

        let mut lines = Vec::new();
        for item in rss.channel.items {
            // Undated items can't be placed in any month.
            let Some(pub_date) = &item.pub_date else {
                continue;
            };
            let published = DateTime::parse_from_rfc2822(pub_date)
                .map_err(|e| RecapError::date(format!("feed pubDate '{pub_date}': {e}")))?
                .with_timezone(&Local)
                .date_naive();
            if !window.contains(published) {
                continue;
            }

            let title = item
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("(untitled)")
                .to_string();
            lines.push(match &item.link {
                Some(link) => format!("[{title}]({link})"),
                None => title,
            });
        }

        Ok(lines)
    }
}

impl Source for WritingFeed {
    fn name(&self) -> &'static str {
        "writing"
    }

    fn request(&self, _window: &TimeWindow) -> Result<RetrievalSpec> {
        Ok(RetrievalSpec::get(&self.feed_url, PayloadFormat::Xml))
    }

    fn render(&self, payload: &Payload, window: &TimeWindow) -> Result<String> {
        let xml = payload.xml()?;
        let mut lines = Self::extract_lines(xml, window)?;
        if self.reverse {
            lines.reverse();
        }

        if lines.is_empty() {
            return Ok("I didn't post any stray writing this month!".to_string());
        }

        Ok(format!(
            "## writing\n\nThis month, I posted {}:\n\n{}",
            count_noun(lines.len(), "post", "posts"),
            bullet_list(&lines)
        ))
    }

    fn failure_line(&self) -> String {
        "My blog feed was unavailable this month.".to_string()
    }
}
