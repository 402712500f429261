//! A1 notation parsing.
//!
//! Cell and range references are validated here before any backend call is
//! made. Sheet-qualified ranges (`'Sheet 1'!A1:B2`) are only ever produced,
//! never accepted from callers: the worksheet is always a separate argument.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ClientError, ClientResult};

/// Google Sheets caps a sheet at column ZZZ.
const MAX_COLUMN_LETTERS: usize = 3;

static CELL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("cell pattern is valid"));

/// A single cell such as `B3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// 1-based column index (`A` = 1)
    pub column: u32,
    /// 1-based row index
    pub row: u32,
}

impl CellRef {
    /// Parse a single-cell reference: column letters followed by a row number.
    ///
    /// Surrounding whitespace is not stripped; `" B3 "` is rejected.
    pub fn parse(input: &str) -> ClientResult<Self> {
        let caps = CELL_PATTERN.captures(input).ok_or_else(|| {
            ClientError::invalid_input(format!(
                "'{input}' is not a single cell reference (expected e.g. 'A1')"
            ))
        })?;
        let column = column_index(&caps[1]).ok_or_else(|| {
            ClientError::invalid_input(format!("column out of range in '{input}'"))
        })?;
        let row = parse_row(&caps[2]).ok_or_else(|| {
            ClientError::invalid_input(format!("row out of range in '{input}'"))
        })?;
        Ok(Self { column, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}

/// One side of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Cell(CellRef),
    /// Whole column, e.g. the `C` in `A:C`
    Column(u32),
    /// Whole row, e.g. the `3` in `1:3`
    Row(u32),
}

impl Endpoint {
    fn parse(input: &str) -> Option<Self> {
        if let Ok(cell) = CellRef::parse(input) {
            return Some(Self::Cell(cell));
        }
        if !input.is_empty() && input.chars().all(|c| c.is_ascii_alphabetic()) {
            return column_index(input).map(Self::Column);
        }
        if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
            return parse_row(input).map(Self::Row);
        }
        None
    }

    /// Column index, if this endpoint pins one.
    pub fn column(&self) -> Option<u32> {
        match self {
            Self::Cell(cell) => Some(cell.column),
            Self::Column(column) => Some(*column),
            Self::Row(_) => None,
        }
    }

    /// Row index, if this endpoint pins one.
    pub fn row(&self) -> Option<u32> {
        match self {
            Self::Cell(cell) => Some(cell.row),
            Self::Row(row) => Some(*row),
            Self::Column(_) => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell(cell) => cell.fmt(f),
            Self::Column(column) => f.write_str(&column_letters(*column)),
            Self::Row(row) => write!(f, "{row}"),
        }
    }
}

/// A validated range: a single cell, or `start:end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRef {
    pub start: Endpoint,
    pub end: Option<Endpoint>,
}

impl RangeRef {
    /// Parse `A1`, `A1:B2`, `A:C`, `A2:C` or `1:3`.
    ///
    /// A lone column or row is rejected; rows only pair with rows.
    pub fn parse(input: &str) -> ClientResult<Self> {
        let invalid = || {
            ClientError::invalid_input(format!(
                "'{input}' is not a valid A1 range (expected e.g. 'A1:D10')"
            ))
        };

        let (start, end) = match input.split_once(':') {
            Some((start, end)) => {
                let start = Endpoint::parse(start).ok_or_else(invalid)?;
                let end = Endpoint::parse(end).ok_or_else(invalid)?;
                (start, Some(end))
            }
            None => (Endpoint::parse(input).ok_or_else(invalid)?, None),
        };

        let well_formed = match (start, end) {
            (Endpoint::Cell(_), None) => true,
            (_, None) => false,
            (Endpoint::Row(_), Some(Endpoint::Row(_))) => true,
            (Endpoint::Row(_), Some(_)) | (_, Some(Endpoint::Row(_))) => false,
            (_, Some(_)) => true,
        };
        if !well_formed {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }

    /// First row covered by the range, when it pins one.
    pub fn start_row(&self) -> Option<u32> {
        self.start.row()
    }

    /// Top-left column covered by the range, defaulting to `A`.
    pub fn start_column(&self) -> u32 {
        self.start.column().unwrap_or(1)
    }
}

impl From<CellRef> for RangeRef {
    fn from(cell: CellRef) -> Self {
        Self {
            start: Endpoint::Cell(cell),
            end: None,
        }
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.end {
            Some(end) => write!(f, "{}:{}", self.start, end),
            None => self.start.fmt(f),
        }
    }
}

/// Convert column letters to a 1-based index. `None` when out of range.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > MAX_COLUMN_LETTERS {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase()
            .then(|| acc * 26 + (c as u32 - 'A' as u32 + 1))
    })
}

/// Convert a 1-based column index to letters (`28` → `AB`).
pub fn column_letters(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn parse_row(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|row| *row >= 1)
}

/// Quote a worksheet title for use in a range string.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Build the range string sent to the API: `'Sheet'` or `'Sheet'!A1:B2`.
pub fn qualified_range(worksheet: &str, range: Option<&RangeRef>) -> String {
    match range {
        Some(range) => format!("{}!{}", quote_sheet_name(worksheet), range),
        None => quote_sheet_name(worksheet),
    }
}

/// Extract the first row of an API-reported range such as `'Log'!A7:C7`.
pub fn first_row_of(reported: &str) -> Option<u32> {
    let local = reported.rsplit_once('!').map_or(reported, |(_, r)| r);
    RangeRef::parse(local).ok().and_then(|range| range.start_row())
}
