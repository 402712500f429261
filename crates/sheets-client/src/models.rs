//! Backend-neutral spreadsheet types.

use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Browser URL for a spreadsheet key.
pub fn spreadsheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{id}")
}

/// Entry returned when listing spreadsheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadsheetSummary {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl SpreadsheetSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: spreadsheet_url(&id),
            id,
            title: title.into(),
        }
    }
}

/// A worksheet (tab) within a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worksheet {
    pub spreadsheet_id: String,
    /// Numeric `sheetId` assigned by the backend
    pub id: i64,
    pub name: String,
    pub row_count: u32,
    pub col_count: u32,
}

/// An opened spreadsheet with its worksheet metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spreadsheet {
    pub id: String,
    pub title: String,
    pub url: String,
    pub worksheets: Vec<Worksheet>,
}

impl Spreadsheet {
    /// Look up a worksheet by exact title.
    pub fn worksheet(&self, name: &str) -> ClientResult<&Worksheet> {
        self.worksheets
            .iter()
            .find(|ws| ws.name == name)
            .ok_or_else(|| ClientError::worksheet_not_found(&self.id, name))
    }
}

/// A scalar cell value as exchanged with callers.
///
/// `Empty` (JSON `null`) is only meaningful in write inputs, where it leaves
/// the corresponding cell blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Empty,
}

impl CellValue {
    /// Convert a raw API value. Nested values are kept as their JSON text.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }

    /// Blank cell as returned by reads.
    pub fn blank() -> Self {
        Self::Text(String::new())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl JsonSchema for CellValue {
    fn schema_name() -> Cow<'static, str> {
        "CellValue".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        schemars::json_schema!({
            "type": ["string", "number", "boolean", "null"],
            "description": "A scalar cell value; null leaves the cell blank"
        })
    }
}

/// Rows of cells, outer vector is rows.
pub type CellGrid = Vec<Vec<CellValue>>;

/// Pad every row with blanks to the width of the widest row.
pub fn rectangular(mut grid: CellGrid) -> CellGrid {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut grid {
        row.resize(width, CellValue::blank());
    }
    grid
}

/// Result of a range write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub updated_range: String,
    pub updated_rows: u32,
    pub updated_columns: u32,
    pub updated_cells: u32,
}

/// Result of an append. `row_index` is set when the backend reports where the
/// row landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendSummary {
    pub updated_range: Option<String>,
    pub row_index: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_deserializes_scalars() {
        let row: Vec<CellValue> =
            serde_json::from_str(r#"["name", 42, 1.5, true, null]"#).unwrap();
        assert_eq!(row[0], CellValue::Text("name".into()));
        assert_eq!(row[1], CellValue::from(42));
        assert!(matches!(row[2], CellValue::Number(_)));
        assert_eq!(row[3], CellValue::Bool(true));
        assert_eq!(row[4], CellValue::Empty);
    }

    #[test]
    fn test_cell_value_rejects_nested() {
        assert!(serde_json::from_str::<CellValue>(r#"{"a": 1}"#).is_err());
        assert!(serde_json::from_str::<CellValue>(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_cell_value_serializes_untagged() {
        let row = vec![CellValue::from("x"), CellValue::from(7), CellValue::Empty];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["x",7,null]"#);
    }

    #[test]
    fn test_rectangular_pads_short_rows() {
        let grid = rectangular(vec![
            vec![CellValue::from("a"), CellValue::from("b"), CellValue::from("c")],
            vec![CellValue::from("d")],
            vec![],
        ]);
        assert!(grid.iter().all(|row| row.len() == 3));
        assert!(grid[1][2].is_blank());
        assert!(grid[2][0].is_blank());
    }

    #[test]
    fn test_worksheet_lookup() {
        let sheet = Spreadsheet {
            id: "key".into(),
            title: "Budget".into(),
            url: spreadsheet_url("key"),
            worksheets: vec![Worksheet {
                spreadsheet_id: "key".into(),
                id: 0,
                name: "Sheet1".into(),
                row_count: 1000,
                col_count: 26,
            }],
        };
        assert_eq!(sheet.worksheet("Sheet1").unwrap().id, 0);
        let err = sheet.worksheet("sheet1").unwrap_err();
        assert!(matches!(err, ClientError::WorksheetNotFound { .. }));
    }
}
