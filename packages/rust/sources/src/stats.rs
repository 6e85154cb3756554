//! Input-device statistics section: keys typed and clicks this month.

use serde::Deserialize;

use recap_shared::{RecapError, Result, StatsConfig, TimeWindow};

use crate::source::{Payload, PayloadFormat, RetrievalSpec, Source};

/// One pulse row; the endpoint serializes counters as strings.
#[derive(Debug, Deserialize)]
struct PulseRow {
    clicks: Counter,
    keys: Counter,
}

#[derive(Debug, Deserialize)]
struct Counter {
    sort: String,
}

#[derive(Debug, Deserialize)]
struct PulseList {
    #[serde(default)]
    data: Vec<PulseRow>,
}

/// Queries the pulse endpoint for the month and renders the `stats` section.
pub struct PulseStats {
    url: String,
    computer_id: String,
}

impl PulseStats {
    pub fn from_config(config: &StatsConfig) -> Self {
        Self {
            url: config.url.clone(),
            computer_id: config.computer_id.clone(),
        }
    }

    fn sum_counters(value: &serde_json::Value) -> Result<(u64, u64)> {
        let list: PulseList = serde_json::from_value(value.clone())
            .map_err(|e| RecapError::shape(format!("pulse payload: {e}")))?;

        let mut keys = 0u64;
        let mut clicks = 0u64;
        for row in &list.data {
            keys += row
                .keys
                .sort
                .parse::<u64>()
                .map_err(|e| RecapError::shape(format!("pulse keys '{}': {e}", row.keys.sort)))?;
            clicks += row.clicks.sort.parse::<u64>().map_err(|e| {
                RecapError::shape(format!("pulse clicks '{}': {e}", row.clicks.sort))
            })?;
        }
        Ok((keys, clicks))
    }
}

impl Source for PulseStats {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn request(&self, window: &TimeWindow) -> Result<RetrievalSpec> {
        // The endpoint filters server-side on an inclusive date range
        // covering the whole month.
        let date_from = window.first_day().format("%Y-%m-%d");
        let date_to = window.last_day().format("%Y-%m-%d");
        let url = format!(
            "{}?view=custom&computerid={}&datefrom={date_from}&dateto={date_to}&pulses_groupby=month&pulses_filterby=allcomputers",
            self.url, self.computer_id
        );
        Ok(RetrievalSpec::get(url, PayloadFormat::Json))
    }

    fn render(&self, payload: &Payload, _window: &TimeWindow) -> Result<String> {
        let (keys, clicks) = Self::sum_counters(payload.json()?)?;
        Ok(format!(
            "## stats\n\nThis month:\n\n- I typed {keys} keys and clicked {clicks} times."
        ))
    }

    fn failure_line(&self) -> String {
        "My input stats were unavailable this month.".to_string()
    }
}
