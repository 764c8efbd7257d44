use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use ics::{
    properties::{CalScale, Description, DtEnd, DtStart, Location, Summary},
    ICalendar,
};
use uuid::Uuid;

use crate::Event;

const PRODUCT_ID: &str = "-//spbu-schedule//EN";
const INSTRUCTOR_LABEL: &str = "Преподаватель";

/// Drops every event whose (start, end, title) was already seen, keeping the first.
///
/// Location and instructor are not part of the key, so two rooms booked for the
/// same slot and title collapse into one event.
pub fn dedup(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();

    events
        .into_iter()
        .filter(|event| seen.insert((event.start, event.end, event.title.clone())))
        .collect()
}

fn format_local(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y%m%dT%H%M%S").to_string()
}

/// Text value escaping; newlines are flattened to spaces.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\r' => {}
            '\n' => escaped.push(' '),
            c => escaped.push(c),
        }
    }

    escaped
}

impl Event {
    pub fn to_ics(&self, dtstamp: &str) -> ics::Event<'static> {
        let mut ics_event = ics::Event::new(Uuid::new_v4().to_string(), dtstamp.to_string());

        ics_event.push(DtStart::new(format_local(&self.start)));
        ics_event.push(DtEnd::new(format_local(&self.end)));
        ics_event.push(Summary::new(escape(&self.title)));

        if !self.location.is_empty() {
            ics_event.push(Location::new(escape(&self.location)));
        }

        if !self.instructor.is_empty() {
            ics_event.push(Description::new(escape(&format!(
                "{INSTRUCTOR_LABEL}: {}",
                self.instructor
            ))));
        }

        ics_event
    }
}

/// Deduplicates `events` and renders them as one VCALENDAR document stamped with `generated`.
pub fn render_calendar(events: Vec<Event>, generated: DateTime<Utc>) -> String {
    let dtstamp = generated.format("%Y%m%dT%H%M%SZ").to_string();

    let mut icalendar = ICalendar::new("2.0", PRODUCT_ID);
    icalendar.push(CalScale::new("GREGORIAN"));

    for event in dedup(events) {
        icalendar.add_event(event.to_ics(&dtstamp));
    }

    icalendar.to_string()
}
