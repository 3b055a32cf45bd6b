use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use calamine::{DataType, Reader, Xlsx, open_workbook_from_rs};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::limits::Limits;
use crate::model::{CellValue, RawRow};

/// Rows pulled out of one upload, plus archive bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Extracted rows in source order. Re-running extraction on the same
    /// bytes produces the same sequence.
    pub rows: Vec<RawRow>,
    /// Number of workbooks the rows came from.
    pub spreadsheets: usize,
    /// Archive entries skipped because they were not spreadsheets.
    pub ignored: usize,
}

/// Reads an upload into rows. Names ending `.zip` are unpacked in memory
/// and every spreadsheet entry is extracted under its own name; anything
/// else is parsed as a single workbook. Only format-level checks happen
/// here; semantic column validation is the compiler's concern.
pub fn extract(bytes: &[u8], filename: &str, limits: &Limits) -> Result<Extraction, ExtractError> {
    check_size(bytes.len() as u64, filename, limits)?;

    if filename.to_ascii_lowercase().ends_with(".zip") {
        extract_archive(bytes, filename, limits)
    } else {
        let mut rows = Vec::new();
        read_workbook(bytes, filename, limits, &mut rows)?;
        Ok(Extraction {
            rows,
            spreadsheets: 1,
            ignored: 0,
        })
    }
}

fn extract_archive(
    bytes: &[u8],
    filename: &str,
    limits: &Limits,
) -> Result<Extraction, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|error| ExtractError::UnreadableFile {
            filename: filename.to_string(),
            message: error.to_string(),
        })?;

    let mut rows = Vec::new();
    let mut spreadsheets = 0;
    let mut ignored = 0;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|error| ExtractError::UnreadableFile {
                filename: filename.to_string(),
                message: error.to_string(),
            })?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let lower = name.to_ascii_lowercase();
        if name.starts_with("__MACOSX")
            || !(lower.ends_with(".xlsx") || lower.ends_with(".xls"))
        {
            ignored += 1;
            continue;
        }

        check_size(entry.size(), &name, limits)?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|error| ExtractError::UnreadableFile {
                filename: name.clone(),
                message: error.to_string(),
            })?;

        // Rows inherit the bare entry name so each entry is classified on
        // its own, independent of directories inside the archive.
        let entry_file = name.rsplit('/').next().unwrap_or(name.as_str()).to_string();
        match read_workbook(&data, &entry_file, limits, &mut rows) {
            Ok(()) => spreadsheets += 1,
            Err(limit @ (ExtractError::RowLimit { .. } | ExtractError::SizeLimit { .. })) => {
                return Err(limit);
            }
            Err(error) => {
                // A bad entry aborts only itself; the rest of the archive
                // still extracts.
                warn!(entry = %name, %error, "skipping unreadable archive entry");
                ignored += 1;
            }
        }
    }

    if spreadsheets == 0 {
        return Err(ExtractError::EmptyArchive(filename.to_string()));
    }

    debug!(spreadsheets, ignored, rows = rows.len(), "archive extracted");
    Ok(Extraction {
        rows,
        spreadsheets,
        ignored,
    })
}

fn read_workbook(
    bytes: &[u8],
    filename: &str,
    limits: &Limits,
    rows: &mut Vec<RawRow>,
) -> Result<(), ExtractError> {
    let mut workbook: Xlsx<Cursor<&[u8]>> = open_workbook_from_rs(Cursor::new(bytes)).map_err(|error: calamine::XlsxError| {
        ExtractError::UnreadableFile {
            filename: filename.to_string(),
            message: error.to_string(),
        }
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    for sheet in sheet_names {
        let Some(range) = workbook.worksheet_range(&sheet) else {
            continue;
        };
        let range = range.map_err(|error| ExtractError::UnreadableFile {
            filename: filename.to_string(),
            message: error.to_string(),
        })?;
        read_sheet(&range, filename, &sheet, limits, rows)?;
    }
    Ok(())
}

fn read_sheet(
    range: &calamine::Range<DataType>,
    filename: &str,
    sheet: &str,
    limits: &Limits,
    rows: &mut Vec<RawRow>,
) -> Result<(), ExtractError> {
    let mut row_iter = range.rows();

    // The first non-empty row names the columns.
    let headers: Vec<String> = loop {
        match row_iter.next() {
            Some(row) if row.iter().any(|cell| !matches!(cell, DataType::Empty)) => {
                break row.iter().map(cell_to_header).collect();
            }
            Some(_) => continue,
            None => return Ok(()),
        }
    };

    let mut row_index: u32 = 0;
    for row in row_iter {
        if row.iter().all(|cell| matches!(cell, DataType::Empty)) {
            continue;
        }
        if rows.len() >= limits.max_rows {
            return Err(ExtractError::RowLimit {
                filename: filename.to_string(),
                limit: limits.max_rows,
            });
        }

        let mut cells = BTreeMap::new();
        for (column, cell) in row.iter().enumerate() {
            let Some(header) = headers.get(column) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            cells.insert(header.clone(), convert_cell(cell));
        }

        rows.push(RawRow {
            source_file: filename.to_string(),
            sheet: sheet.to_string(),
            row_index,
            cells,
        });
        row_index += 1;
    }
    Ok(())
}

fn check_size(actual: u64, filename: &str, limits: &Limits) -> Result<(), ExtractError> {
    if actual > limits.max_file_bytes {
        return Err(ExtractError::SizeLimit {
            filename: filename.to_string(),
            actual,
            limit: limits.max_file_bytes,
        });
    }
    Ok(())
}

fn cell_to_header(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.trim().to_string(),
        DataType::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn convert_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Text(value.to_string()),
        other => match other.as_date() {
            Some(date) => CellValue::Date(date),
            None => CellValue::Text(other.to_string()),
        },
    }
}
