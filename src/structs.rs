use chrono::NaiveDateTime;
use serde::Serialize;

/// A single class occurrence taken from one spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instructor: String,
}
