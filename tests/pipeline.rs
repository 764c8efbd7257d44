use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_xlsxwriter::{Format, Workbook};
use tempfile::TempDir;

use timetable_ics::config::{Config, Format as OutputFormat};
use timetable_ics::fetch::{Fetch, FetchError};
use timetable_ics::parser::extract_events;
use timetable_ics::sync::{run, Outcome};

const SITE_ROOT: &str = "https://timetable.example.org";

/// Serves canned bodies; unknown urls answer 404.
#[derive(Default)]
struct StubFetcher {
    bodies: HashMap<String, Vec<u8>>,
}

impl StubFetcher {
    fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }
}

impl Fetch for StubFetcher {
    fn get(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, FetchError> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn schedule_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    sheet
        .write_string(0, 0, "Расписание занятий группы 24.Б01-пу, 2025 г.")
        .unwrap();

    let header = ["Время", "Название", "Места проведения", "Преподаватели"];
    for (col, title) in header.iter().enumerate() {
        sheet.write_string(3, col as u16 + 1, *title).unwrap();
    }

    sheet
        .merge_range(4, 0, 5, 0, "понедельник\n22 сентября", &Format::new())
        .unwrap();
    sheet.write_string(4, 1, "09:00–10:35").unwrap();
    sheet.write_string(4, 2, "Алгебра").unwrap();
    sheet.write_string(4, 3, "ауд. 1").unwrap();
    sheet.write_string(4, 4, "Иванов И. И.").unwrap();

    sheet.write_string(5, 1, "10:45 - 12:20").unwrap();
    sheet.write_string(5, 2, "Геометрия, практика").unwrap();

    sheet.write_string(6, 0, "вторник\n23 сентября").unwrap();
    sheet.write_string(6, 2, "Самостоятельная работа").unwrap();

    sheet.write_string(7, 1, "13:00—14:35").unwrap();
    sheet.write_string(7, 2, "Физика").unwrap();
    sheet.write_string(7, 3, "ауд. 2").unwrap();

    workbook.save_to_buffer().unwrap()
}

fn listing_page(href: &str) -> String {
    format!(
        r#"<html><body>
            <a href="/EARTH/Help">Помощь</a>
            <a href="{href}">Скачать Excel</a>
        </body></html>"#
    )
}

fn week_url(date: &str) -> String {
    format!("{SITE_ROOT}/EARTH/StudentGroupEvents/Primary/427997/{date}")
}

fn now() -> DateTime<Utc> {
    // A Wednesday; the first fetched week starts on 2025-09-22.
    Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0).unwrap()
}

fn config(dir: &TempDir, weeks: usize) -> Config {
    Config {
        site_root: SITE_ROOT.into(),
        weeks,
        output: dir.path().join("schedule.ics"),
        ..Config::default()
    }
}

fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
}

#[test]
fn extracts_events_from_workbook_bytes() {
    let events = extract_events(&schedule_workbook(), 1999).unwrap();

    let summary: Vec<_> = events
        .iter()
        .map(|event| (event.start, event.end, event.title.as_str()))
        .collect();

    assert_eq!(
        summary,
        [
            (at("2025-09-22 09:00"), at("2025-09-22 10:35"), "Алгебра"),
            (at("2025-09-22 10:45"), at("2025-09-22 12:20"), "Геометрия, практика"),
            (at("2025-09-23 13:00"), at("2025-09-23 14:35"), "Физика"),
        ]
    );

    assert_eq!(events[0].location, "ауд. 1");
    assert_eq!(events[0].instructor, "Иванов И. И.");
    assert_eq!(events[1].location, "");
    assert!(events.iter().all(|event| event.start < event.end));
}

#[test]
fn unreadable_workbook_is_an_error() {
    assert!(extract_events(b"<html>not a workbook</html>", 2025).is_err());
}

#[test]
fn writes_calendar_from_available_weeks() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, 3);

    let fetcher = StubFetcher::default()
        .with(&week_url("2025-09-22"), listing_page("/files/w1.xlsx"))
        .with(&format!("{SITE_ROOT}/files/w1.xlsx"), schedule_workbook())
        // Second week: listing page without any spreadsheet link.
        .with(&week_url("2025-09-29"), r#"<a href="/EARTH/Help">Помощь</a>"#)
        // Third week republishes the first file, its events must not repeat.
        .with(&week_url("2025-10-06"), listing_page("/files/w1.xlsx"));

    let outcome = run(&config, &fetcher, now()).unwrap();
    assert_eq!(
        outcome,
        Outcome::Written {
            path: config.output.clone(),
            events: 3,
        }
    );

    let ics = fs::read_to_string(&config.output).unwrap();
    assert!(ics.starts_with("BEGIN:VCALENDAR"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
    assert!(ics.contains("DTSTAMP:20250924T100000Z"));
    assert!(ics.contains("DTSTART:20250922T090000"));
    assert!(ics.contains("SUMMARY:Геометрия\\, практика"));
    assert!(ics.contains("LOCATION:ауд. 2"));
    assert!(ics.contains("DESCRIPTION:Преподаватель: Иванов И. И."));
}

#[test]
fn skips_weeks_with_broken_downloads() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, 2);

    let fetcher = StubFetcher::default()
        .with(&week_url("2025-09-22"), listing_page("/files/missing.xlsx"))
        .with(&week_url("2025-09-29"), listing_page("/files/w2.xlsx"))
        .with(&format!("{SITE_ROOT}/files/w2.xlsx"), "garbage");

    assert_eq!(run(&config, &fetcher, now()).unwrap(), Outcome::NoEvents);
    assert!(!config.output.exists());
}

#[test]
fn no_events_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, 4);

    let outcome = run(&config, &StubFetcher::default(), now()).unwrap();

    assert_eq!(outcome, Outcome::NoEvents);
    assert!(!config.output.exists());
}

#[test]
fn writes_json_when_requested() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        format: OutputFormat::Json,
        output: dir.path().join("schedule.json"),
        ..config(&dir, 1)
    };

    let fetcher = StubFetcher::default()
        .with(&week_url("2025-09-22"), listing_page("/files/w1.xlsx"))
        .with(&format!("{SITE_ROOT}/files/w1.xlsx"), schedule_workbook());

    run(&config, &fetcher, now()).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
    let events = json.as_array().unwrap();

    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["title"], "Алгебра");
    assert_eq!(events[0]["start"], "2025-09-22T09:00:00");
    assert_eq!(events[0]["instructor"], "Иванов И. И.");
    assert!(events[1].get("location").is_none());
}

#[test]
fn unwritable_output_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        output: dir.path().join("missing").join("schedule.ics"),
        ..config(&dir, 1)
    };

    let fetcher = StubFetcher::default()
        .with(&week_url("2025-09-22"), listing_page("/files/w1.xlsx"))
        .with(&format!("{SITE_ROOT}/files/w1.xlsx"), schedule_workbook());

    assert!(run(&config, &fetcher, now()).is_err());
}
