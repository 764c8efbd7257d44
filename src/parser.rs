use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::grid::{Cell, Grid, Table, WorkbookError};
use crate::months::month_number;
use crate::year::infer_year;
use crate::Event;

/// Title and metadata rows above the column header.
const HEADER_ROWS: usize = 3;

const DAY_COLUMN: usize = 0;
const TIME_HEADER: &str = "Время";
const TITLE_HEADER: &str = "Название";
const LOCATION_HEADER: &str = "Места проведения";
const INSTRUCTOR_HEADER: &str = "Преподаватели";

static DAY_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]{1,2})\s+([а-яё]+)(?:\s+([0-9]{4}))?").unwrap());
static TIME_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-–—]").unwrap());

/// Why a spreadsheet row did not produce an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no time given")]
    MissingTime,
    #[error("no title given")]
    MissingTitle,
    #[error("no day label above the row")]
    MissingDayLabel,
    #[error("day label {0:?} has no `<day> <month>` date")]
    UnrecognizedDayLabel(String),
    #[error("unknown month {0:?}")]
    UnknownMonth(String),
    #[error("{year}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("time {0:?} is not a `<start>-<end>` range")]
    MalformedTimeRange(String),
    #[error("invalid time of day {0:?}")]
    InvalidTime(String),
    #[error("event does not end after it starts")]
    EmptyInterval,
}

/// Positions of the columns an event is built from.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub day: usize,
    pub time: Option<usize>,
    pub title: Option<usize>,
    pub location: Option<usize>,
    pub instructor: Option<usize>,
}

impl Columns {
    pub fn locate(table: &Table) -> Self {
        Self {
            day: DAY_COLUMN,
            time: table.column(TIME_HEADER),
            title: table.column(TITLE_HEADER),
            location: table.column(LOCATION_HEADER),
            instructor: table.column(INSTRUCTOR_HEADER),
        }
    }
}

/// Reads every event of a weekly schedule workbook.
///
/// Rows that can't be turned into an event are logged and skipped.
pub fn extract_events(bytes: &[u8], fallback_year: i32) -> Result<Vec<Event>, WorkbookError> {
    let grid = Grid::from_bytes(bytes)?;
    Ok(events_from_grid(&grid, fallback_year))
}

pub fn events_from_grid(grid: &Grid, fallback_year: i32) -> Vec<Event> {
    let year = infer_year(grid, fallback_year);

    let mut table = Table::from_grid(grid, HEADER_ROWS);
    table.forward_fill(DAY_COLUMN);

    let columns = Columns::locate(&table);

    let mut events = Vec::new();
    for (idx, row) in table.rows().iter().enumerate() {
        match parse_row(row, &columns, year) {
            Ok(event) => events.push(event),
            Err(reason) => log::debug!("Skipping data row {}: {reason}", idx + 1),
        }
    }

    events
}

fn cell_text<'a>(row: &'a [Cell], column: Option<usize>) -> Option<&'a str> {
    row.get(column?)?.text().map(str::trim)
}

pub fn parse_row(row: &[Cell], columns: &Columns, year: i32) -> Result<Event, SkipReason> {
    let time = cell_text(row, columns.time).ok_or(SkipReason::MissingTime)?;
    let title = cell_text(row, columns.title).ok_or(SkipReason::MissingTitle)?;

    let label = cell_text(row, Some(columns.day)).ok_or(SkipReason::MissingDayLabel)?;
    let date = parse_day_label(label, year)?;

    let (start, end) = parse_time_range(time)?;
    if end <= start {
        return Err(SkipReason::EmptyInterval);
    }

    Ok(Event {
        start: date.and_time(start),
        end: date.and_time(end),
        title: title.to_string(),
        location: cell_text(row, columns.location)
            .unwrap_or_default()
            .to_string(),
        instructor: cell_text(row, columns.instructor)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Parses labels like `"среда\n24 сентября"` or `"24 сентября 2025"`.
///
/// Only the last line is considered. `year` applies when the label carries none.
pub fn parse_day_label(label: &str, year: i32) -> Result<NaiveDate, SkipReason> {
    let line = label.trim().lines().last().unwrap_or_default().trim();

    let captures = DAY_LABEL
        .captures(line)
        .ok_or_else(|| SkipReason::UnrecognizedDayLabel(label.to_string()))?;

    let unrecognized = || SkipReason::UnrecognizedDayLabel(label.to_string());

    let day = captures[1].parse::<u32>().map_err(|_| unrecognized())?;

    let month_name = captures[2].to_lowercase();
    let month = month_number(&month_name).ok_or(SkipReason::UnknownMonth(month_name))?;

    let year = match captures.get(3) {
        Some(explicit) => explicit.as_str().parse::<i32>().map_err(|_| unrecognized())?,
        None => year,
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or(SkipReason::InvalidDate { year, month, day })
}

/// Splits `"09:00 – 10:35"` into its bounds. Hyphen, en dash and em dash are accepted.
pub fn parse_time_range(text: &str) -> Result<(NaiveTime, NaiveTime), SkipReason> {
    let mut parts = TIME_SEPARATOR.split(text.trim()).map(str::trim);

    let (Some(start), Some(end)) = (parts.next(), parts.next()) else {
        return Err(SkipReason::MalformedTimeRange(text.to_string()));
    };

    Ok((parse_time(start)?, parse_time(end)?))
}

fn parse_time(text: &str) -> Result<NaiveTime, SkipReason> {
    NaiveTime::parse_from_str(text, "%H:%M").map_err(|_| SkipReason::InvalidTime(text.to_string()))
}
