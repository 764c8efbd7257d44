use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("unreadable workbook: {0}")]
    Unreadable(#[from] calamine::Error),
    #[error("workbook has no worksheets")]
    NoWorksheet,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    /// Any non-text value, kept in its display form.
    Value(String),
}

impl Cell {
    /// Content of the cell as text, `None` when it is empty or whitespace only.
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Empty => None,
            Cell::Text(text) | Cell::Value(text) => {
                (!text.trim().is_empty()).then_some(text.as_str())
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_none()
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(text) => Cell::Text(text.clone()),
            other => Cell::Value(other.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

static EMPTY: Cell = Cell::Empty;

/// Raw first worksheet, anchored at A1 and without any header interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Reads the first worksheet of an `.xlsx`/`.xls`/`.ods` file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WorkbookError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(WorkbookError::NoWorksheet)??;

        let Some((first_row, first_column)) = range.start() else {
            return Ok(Self::default());
        };

        // calamine ranges begin at the first used cell; pad back to A1.
        let mut rows = vec![Vec::new(); first_row as usize];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; first_column as usize];
            cells.extend(row.iter().map(Cell::from));
            rows.push(cells);
        }

        Ok(Self { rows })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Out of range positions read as empty cells.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY)
    }
}

/// Data part of a sheet: one header row followed by data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Skips `skip_rows` leading rows, takes the next one as header and the rest as data.
    pub fn from_grid(grid: &Grid, skip_rows: usize) -> Self {
        let width = grid.width();

        let header = (0..width)
            .map(|column| {
                grid.cell(skip_rows, column)
                    .text()
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default()
            })
            .collect();

        let rows = (skip_rows + 1..grid.height())
            .map(|row| {
                (0..width)
                    .map(|column| grid.cell(row, column).clone())
                    .collect()
            })
            .collect();

        Self { header, rows }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|header| header == name)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Copies the last non-blank value of `column` into the blank cells below it.
    pub fn forward_fill(&mut self, column: usize) {
        let mut last: Option<Cell> = None;

        for row in &mut self.rows {
            let Some(cell) = row.get_mut(column) else {
                continue;
            };

            if cell.is_blank() {
                if let Some(last) = &last {
                    *cell = last.clone();
                }
            } else {
                last = Some(cell.clone());
            }
        }
    }
}
