use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use log::{info, warn};
use scraper::Html;
use url::Url;

use crate::config::{Config, Format};
use crate::fetch::Fetch;
use crate::ics::{dedup, render_calendar};
use crate::link::find_download_link;
use crate::parser::extract_events;
use crate::week::Weeks;
use crate::Event;

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Written { path: PathBuf, events: usize },
    NoEvents,
}

/// Collects the events of one week, `None` when the week has to be skipped.
fn fetch_week<F: Fetch>(
    config: &Config,
    fetcher: &F,
    page_url: &str,
    year: i32,
) -> Option<Vec<Event>> {
    let page = match fetcher.get(page_url, config.page_timeout) {
        Ok(page) => page,
        Err(err) => {
            warn!("Skipping week: {err}");
            return None;
        }
    };

    let base_url = match Url::parse(page_url) {
        Ok(url) => url,
        Err(err) => {
            warn!("Skipping week: invalid page url {page_url}: {err}");
            return None;
        }
    };

    let document = Html::parse_document(&String::from_utf8_lossy(&page));
    let Some(link) = find_download_link(&document, &base_url) else {
        warn!("No download link on {page_url}");
        return None;
    };

    info!("Found {link}");

    let workbook = match fetcher.get(link.as_str(), config.file_timeout) {
        Ok(workbook) => workbook,
        Err(err) => {
            warn!("Failed download: {err}");
            return None;
        }
    };

    match extract_events(&workbook, year) {
        Ok(events) => {
            info!("Parsed {} events", events.len());
            Some(events)
        }
        Err(err) => {
            warn!("Skipping {link}: {err}");
            None
        }
    }
}

/// Fetches every configured week and writes the merged calendar.
///
/// Weeks that fail are logged and skipped. Nothing is written when no week
/// yields an event. Only a failure to write the output is an error.
pub fn run<F: Fetch>(config: &Config, fetcher: &F, now: DateTime<Utc>) -> Result<Outcome> {
    let today = now.date_naive();
    let mut events = Vec::new();

    for monday in Weeks::starting(today, config.weeks) {
        let page_url = config.week_url(monday);
        info!("Fetching week of {monday}");

        if let Some(mut week_events) = fetch_week(config, fetcher, &page_url, today.year()) {
            events.append(&mut week_events);
        }
    }

    if events.is_empty() {
        info!("No events found, {} is not written", config.output.display());
        return Ok(Outcome::NoEvents);
    }

    let unique = dedup(events);
    let count = unique.len();

    let contents = match config.format {
        Format::Ics => render_calendar(unique, now),
        Format::Json => {
            serde_json::to_string_pretty(&unique).context("Failed to serialize events")?
        }
    };

    fs::write(&config.output, contents)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    info!("Wrote {count} events to {}", config.output.display());

    Ok(Outcome::Written {
        path: config.output.clone(),
        events: count,
    })
}
