use chrono::{Datelike, Duration, NaiveDate};

/// Monday of the week `date` falls in.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Consecutive Mondays, starting at the week of a given date.
pub struct Weeks {
    next: NaiveDate,
    remaining: usize,
}

impl Weeks {
    pub fn starting(date: NaiveDate, count: usize) -> Self {
        Self {
            next: monday_of(date),
            remaining: count,
        }
    }
}

impl Iterator for Weeks {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        let week = self.next;
        self.next = week + Duration::days(7);
        Some(week)
    }
}
