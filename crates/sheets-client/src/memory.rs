//! In-memory backend for tests.
//!
//! Mirrors the Google backend's observable behaviour closely enough to drive
//! the tool layer: writes land at the range's top-left cell and grow the
//! grid, appends go after the last non-empty row, reads trim trailing blanks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::a1::{self, Endpoint, RangeRef};
use crate::backend::SheetsBackend;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    spreadsheet_url, AppendSummary, CellGrid, CellValue, Spreadsheet, SpreadsheetSummary,
    UpdateSummary, Worksheet,
};

const DEFAULT_ROWS: u32 = 1000;
const DEFAULT_COLS: u32 = 26;

#[derive(Debug)]
struct MemoryWorksheet {
    id: i64,
    name: String,
    rows: u32,
    cols: u32,
    cells: CellGrid,
}

impl MemoryWorksheet {
    fn new(id: i64, name: &str, rows: u32, cols: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            rows,
            cols,
            cells: Vec::new(),
        }
    }

    fn reference(&self, spreadsheet_id: &str) -> Worksheet {
        Worksheet {
            spreadsheet_id: spreadsheet_id.to_string(),
            id: self.id,
            name: self.name.clone(),
            row_count: self.rows,
            col_count: self.cols,
        }
    }

    fn used_rows(&self) -> u32 {
        self.cells
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_blank()))
            .map_or(0, |idx| idx as u32 + 1)
    }

    fn used_cols(&self) -> u32 {
        self.cells
            .iter()
            .filter_map(|row| row.iter().rposition(|c| !c.is_blank()))
            .max()
            .map_or(0, |idx| idx as u32 + 1)
    }

    fn cell(&self, row: u32, col: u32) -> CellValue {
        self.cells
            .get(row as usize - 1)
            .and_then(|r| r.get(col as usize - 1))
            .cloned()
            .unwrap_or_else(CellValue::blank)
    }

    fn set(&mut self, row: u32, col: u32, value: &CellValue) {
        let (r, c) = (row as usize - 1, col as usize - 1);
        if self.cells.len() <= r {
            self.cells.resize_with(r + 1, Vec::new);
        }
        let line = &mut self.cells[r];
        if line.len() <= c {
            line.resize(c + 1, CellValue::blank());
        }
        line[c] = match value {
            CellValue::Empty => CellValue::blank(),
            other => other.clone(),
        };
        self.rows = self.rows.max(row);
        self.cols = self.cols.max(col);
    }

    fn write_block(&mut self, top: u32, left: u32, values: &CellGrid) -> UpdateSummary {
        let mut cells = 0;
        let mut width = 0;
        for (dr, row) in values.iter().enumerate() {
            for (dc, value) in row.iter().enumerate() {
                self.set(top + dr as u32, left + dc as u32, value);
                cells += 1;
            }
            width = width.max(row.len() as u32);
        }
        let height = values.len() as u32;
        let end_col = left + width.max(1) - 1;
        let end_row = top + height.max(1) - 1;
        UpdateSummary {
            updated_range: format!(
                "{}!{}{}:{}{}",
                a1::quote_sheet_name(&self.name),
                a1::column_letters(left),
                top,
                a1::column_letters(end_col),
                end_row
            ),
            updated_rows: height,
            updated_columns: width,
            updated_cells: cells,
        }
    }

    /// Read a rectangle, trimming trailing blank rows and cells like the API.
    fn read(&self, range: Option<&RangeRef>) -> CellGrid {
        let (used_rows, used_cols) = (self.used_rows(), self.used_cols());
        let (top, left, bottom, right) = match range {
            None => (1, 1, used_rows, used_cols),
            Some(range) => {
                let end = range.end.unwrap_or(range.start);
                let top = range.start.row().unwrap_or(1);
                let left = range.start.column().unwrap_or(1);
                let bottom = match end {
                    Endpoint::Column(_) => used_rows,
                    other => other.row().unwrap_or(used_rows),
                };
                let right = match end {
                    Endpoint::Row(_) => used_cols,
                    other => other.column().unwrap_or(used_cols),
                };
                (top, left, bottom.min(used_rows), right.min(used_cols))
            }
        };

        let mut grid: CellGrid = (top..=bottom)
            .map(|row| {
                let mut line: Vec<CellValue> =
                    (left..=right).map(|col| self.cell(row, col)).collect();
                while line.last().is_some_and(CellValue::is_blank) {
                    line.pop();
                }
                line
            })
            .collect();
        while grid.last().is_some_and(Vec::is_empty) {
            grid.pop();
        }
        grid
    }
}

#[derive(Debug)]
struct MemorySpreadsheet {
    id: String,
    title: String,
    worksheets: Vec<MemoryWorksheet>,
    next_sheet_id: i64,
}

impl MemorySpreadsheet {
    fn snapshot(&self) -> Spreadsheet {
        Spreadsheet {
            id: self.id.clone(),
            title: self.title.clone(),
            url: spreadsheet_url(&self.id),
            worksheets: self.worksheets.iter().map(|ws| ws.reference(&self.id)).collect(),
        }
    }

    fn worksheet_mut(&mut self, name: &str) -> ClientResult<&mut MemoryWorksheet> {
        let id = self.id.clone();
        self.worksheets
            .iter_mut()
            .find(|ws| ws.name == name)
            .ok_or_else(|| ClientError::worksheet_not_found(id, name))
    }

    fn add_worksheet(
        &mut self,
        name: &str,
        rows: u32,
        cols: u32,
    ) -> ClientResult<&MemoryWorksheet> {
        if self.worksheets.iter().any(|ws| ws.name == name) {
            return Err(ClientError::invalid_input(format!(
                "A sheet with the name \"{name}\" already exists"
            )));
        }
        let id = self.next_sheet_id;
        self.next_sheet_id += 1;
        self.worksheets.push(MemoryWorksheet::new(id, name, rows, cols));
        Ok(self.worksheets.last().expect("worksheet was just pushed"))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    spreadsheets: Vec<MemorySpreadsheet>,
    next_id: u64,
    read_only: bool,
    unavailable: bool,
}

impl MemoryState {
    fn spreadsheet(&self, id: &str) -> ClientResult<&MemorySpreadsheet> {
        self.spreadsheets
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ClientError::spreadsheet_not_found(id))
    }

    fn spreadsheet_mut(&mut self, id: &str) -> ClientResult<&mut MemorySpreadsheet> {
        self.spreadsheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ClientError::spreadsheet_not_found(id))
    }

    fn create(&mut self, title: &str) -> &MemorySpreadsheet {
        self.next_id += 1;
        let id = format!("mem{:040}", self.next_id);
        let mut sheet = MemorySpreadsheet {
            id,
            title: title.to_string(),
            worksheets: Vec::new(),
            next_sheet_id: 0,
        };
        // A fresh spreadsheet always has one worksheet.
        sheet
            .add_worksheet("Sheet1", DEFAULT_ROWS, DEFAULT_COLS)
            .expect("fresh spreadsheet has no worksheets");
        self.spreadsheets.push(sheet);
        self.spreadsheets.last().expect("spreadsheet was just pushed")
    }
}

/// Deterministic in-process [`SheetsBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a spreadsheet and return its id. Does not count as a call.
    pub fn seed_spreadsheet(&self, title: &str) -> String {
        self.lock().create(title).id.clone()
    }

    /// Seed a worksheet with initial contents. Does not count as a call.
    pub fn seed_worksheet(
        &self,
        spreadsheet_id: &str,
        name: &str,
        cells: CellGrid,
    ) -> ClientResult<()> {
        let mut state = self.lock();
        let sheet = state.spreadsheet_mut(spreadsheet_id)?;
        if sheet.worksheet_mut(name).is_err() {
            sheet.add_worksheet(name, DEFAULT_ROWS, DEFAULT_COLS)?;
        }
        sheet.worksheet_mut(name)?.write_block(1, 1, &cells);
        Ok(())
    }

    /// Number of backend operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reject every write with a 403, as Google does for view-only shares.
    pub fn set_read_only(&self, read_only: bool) {
        self.lock().read_only = read_only;
    }

    /// Fail every call as if the API were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count the call and apply injected failures.
    fn enter(&self, write: bool) -> ClientResult<MutexGuard<'_, MemoryState>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if state.unavailable {
            return Err(ClientError::service_unavailable("memory", "backend offline"));
        }
        if write && state.read_only {
            return Err(ClientError::api_error(
                403,
                "The caller does not have permission (PERMISSION_DENIED)",
            ));
        }
        Ok(state)
    }
}

#[async_trait]
impl SheetsBackend for MemoryBackend {
    async fn list_spreadsheets(&self) -> ClientResult<Vec<SpreadsheetSummary>> {
        let state = self.enter(false)?;
        Ok(state
            .spreadsheets
            .iter()
            .map(|s| SpreadsheetSummary::new(&s.id, &s.title))
            .collect())
    }

    async fn open_by_key(&self, key: &str) -> ClientResult<Spreadsheet> {
        let state = self.enter(false)?;
        Ok(state.spreadsheet(key)?.snapshot())
    }

    async fn open_by_title(&self, title: &str) -> ClientResult<Spreadsheet> {
        let state = self.enter(false)?;
        state
            .spreadsheets
            .iter()
            .find(|s| s.title == title)
            .map(MemorySpreadsheet::snapshot)
            .ok_or_else(|| ClientError::spreadsheet_not_found(title))
    }

    async fn read_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: Option<&RangeRef>,
    ) -> ClientResult<CellGrid> {
        let mut state = self.enter(false)?;
        let ws = state.spreadsheet_mut(spreadsheet_id)?.worksheet_mut(worksheet)?;
        Ok(ws.read(range))
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: &RangeRef,
        values: &CellGrid,
    ) -> ClientResult<UpdateSummary> {
        let mut state = self.enter(true)?;
        let ws = state.spreadsheet_mut(spreadsheet_id)?.worksheet_mut(worksheet)?;
        let top = range.start_row().unwrap_or(1);
        Ok(ws.write_block(top, range.start_column(), values))
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[CellValue],
    ) -> ClientResult<AppendSummary> {
        let mut state = self.enter(true)?;
        let ws = state.spreadsheet_mut(spreadsheet_id)?.worksheet_mut(worksheet)?;
        let row = ws.used_rows() + 1;
        let summary = ws.write_block(row, 1, &vec![values.to_vec()]);
        Ok(AppendSummary {
            row_index: a1::first_row_of(&summary.updated_range),
            updated_range: Some(summary.updated_range),
        })
    }

    async fn create_spreadsheet(&self, title: &str) -> ClientResult<Spreadsheet> {
        let mut state = self.enter(true)?;
        Ok(state.create(title).snapshot())
    }

    async fn create_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> ClientResult<Worksheet> {
        let mut state = self.enter(true)?;
        let sheet = state.spreadsheet_mut(spreadsheet_id)?;
        let id = sheet.id.clone();
        Ok(sheet.add_worksheet(title, rows, cols)?.reference(&id))
    }
}
