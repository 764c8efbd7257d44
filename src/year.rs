use once_cell::sync::Lazy;
use regex::Regex;

use crate::grid::{Cell, Grid};

/// Year annotations are expected near the top-left corner of the sheet.
const SCAN_ROWS: usize = 8;
const SCAN_COLUMNS: usize = 8;

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").unwrap());

/// Returns the first four digit number found in a text cell of the top-left 8×8 block,
/// scanning row by row, or `fallback` when there is none.
pub fn infer_year(grid: &Grid, fallback: i32) -> i32 {
    for row in 0..SCAN_ROWS.min(grid.height()) {
        for column in 0..SCAN_COLUMNS {
            let Cell::Text(text) = grid.cell(row, column) else {
                continue;
            };

            if let Some(year) = YEAR.find(text).and_then(|m| m.as_str().parse().ok()) {
                return year;
            }
        }
    }

    fallback
}
