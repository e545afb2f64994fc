// Excel export of result tables (xlsx only)
//
// One worksheet per table, every cell written as a string so identifiers
// keep their leading zeros.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use rosterdiff_recon::ResultTable;

use crate::error::IoError;

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Excel caps column width at 255 characters; keep exports readable.
const MAX_COLUMN_WIDTH: usize = 60;

fn build_workbook(table: &ResultTable, sheet_name: &str) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;
    write_sheet(worksheet, table)?;
    Ok(workbook)
}

fn write_sheet(worksheet: &mut Worksheet, table: &ResultTable) -> Result<(), XlsxError> {
    let header = Format::new().set_bold();
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row32 = (r + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet.write_string(row32, col as u16, value)?;
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(value.chars().count());
            }
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (*width).clamp(8, MAX_COLUMN_WIDTH) + 2;
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    // Keep the header (and the index column, when there is one) in view.
    let freeze_col = if table.index.is_some() { 1 } else { 0 };
    worksheet.set_freeze_panes(1, freeze_col)?;

    if !table.columns.is_empty() {
        worksheet.autofilter(0, 0, table.rows.len() as u32, (table.columns.len() - 1) as u16)?;
    }
    Ok(())
}

pub fn export(table: &ResultTable, path: &Path) -> Result<(), IoError> {
    let mut workbook = build_workbook(table, DEFAULT_SHEET_NAME)?;
    workbook.save(path).map_err(|e| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
