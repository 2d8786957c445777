//! Price workbooks.
//!
//! Excel workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are read with
//! calamine, one named worksheet per price table. Sheets exported to CSV are
//! accepted too: a directory holding one `<sheet>.csv` per sheet, or a single
//! `.csv` file that acts as its only sheet. In each sheet the first column is
//! the date index and every other column holds the closing prices of one
//! symbol, with a header row naming them.

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{PriceError, Result};
use crate::models::PriceFrame;

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
/// Cell texts read as a missing price.
const NA_VALUES: &[&str] = &["#N/A", "#N/A N/A", "N/A", "NA", "NaN", "nan"];

#[derive(Debug, PartialEq)]
enum SheetFile {
    Excel(PathBuf),
    Csv(PathBuf),
}

/// Read `sheet` of the workbook at `path`.
///
/// `path` may name the workbook file itself, a directory of CSV sheets, or
/// the workbook without its extension (`.xlsx`, `.xls` and `.csv` are tried in
/// that order).
pub fn open_price_file(path: &Path, sheet: &str) -> Result<PriceFrame> {
    match resolve_sheet(path, sheet)? {
        SheetFile::Excel(workbook) => {
            tracing::info!("Reading sheet '{}' of {}", sheet, workbook.display());
            read_excel_sheet(&workbook, sheet)
        }
        SheetFile::Csv(sheet_path) => {
            tracing::info!("Reading price sheet {}", sheet_path.display());
            let file = File::open(&sheet_path)
                .map_err(|e| PriceError::Workbook(format!("{}: {}", sheet_path.display(), e)))?;
            read_sheet(BufReader::new(file))
        }
    }
}

fn is_excel(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| EXCEL_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

fn resolve_sheet(path: &Path, sheet: &str) -> Result<SheetFile> {
    if path.is_dir() {
        let sheet_path = path.join(format!("{}.csv", sheet));
        if sheet_path.is_file() {
            return Ok(SheetFile::Csv(sheet_path));
        }
        return Err(PriceError::Workbook(format!(
            "sheet '{}' not found in {}",
            sheet,
            path.display()
        )));
    }

    if path.is_file() {
        return Ok(if is_excel(path) {
            SheetFile::Excel(path.to_path_buf())
        } else {
            SheetFile::Csv(path.to_path_buf())
        });
    }

    for ext in ["xlsx", "xls", "csv"] {
        let candidate = PathBuf::from(format!("{}.{}", path.display(), ext));
        if candidate.is_file() {
            return Ok(if ext == "csv" {
                SheetFile::Csv(candidate)
            } else {
                SheetFile::Excel(candidate)
            });
        }
    }

    Err(PriceError::Workbook(format!("workbook {} not found", path.display())))
}

/// Read the worksheet named `sheet` from an Excel workbook.
pub fn read_excel_sheet(path: &Path, sheet: &str) -> Result<PriceFrame> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| PriceError::Workbook(format!("{}: {}", path.display(), e)))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(PriceError::Workbook(format!(
            "sheet '{}' not found in {}",
            sheet,
            path.display()
        )));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| PriceError::Workbook(format!("{} sheet '{}': {}", path.display(), sheet, e)))?;
    read_range(&range)
}

fn read_range(range: &Range<Data>) -> Result<PriceFrame> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| PriceError::Workbook("sheet is empty".to_string()))?;

    if header.len() < 2 {
        return Err(PriceError::Workbook(
            "sheet needs a date column and at least one price column".to_string(),
        ));
    }

    let names: Vec<String> = header.iter().skip(1).map(|h| h.to_string().trim().to_string()).collect();
    let mut observations: Vec<Vec<(NaiveDate, f64)>> = vec![Vec::new(); names.len()];

    for (line, row) in rows.enumerate() {
        let raw_date = match row.first() {
            None | Some(Data::Empty) => continue,
            Some(cell) => cell,
        };
        let date = cell_date(raw_date)
            .ok_or_else(|| PriceError::Workbook(format!("row {}: invalid date '{}'", line + 2, raw_date)))?;

        for (col, obs) in observations.iter_mut().enumerate() {
            let value = match row.get(col + 1) {
                None => f64::NAN,
                Some(cell) => cell_price(cell).ok_or_else(|| {
                    PriceError::Workbook(format!(
                        "row {}: invalid price '{}' for {}",
                        line + 2,
                        cell,
                        names[col]
                    ))
                })?,
            };
            obs.push((date, value));
        }
    }

    Ok(PriceFrame::from_observations(
        names.into_iter().zip(observations).collect(),
    ))
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::Float(serial) => from_excel_serial(*serial),
        Data::Int(serial) => from_excel_serial(*serial as f64),
        Data::String(text) | Data::DateTimeIso(text) => parse_sheet_date(text.trim()),
        _ => None,
    }
}

/// Day number of the 1900 date system to a date; the time of day is dropped.
fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.trunc() as i64)?)
}

fn cell_price(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::Empty | Data::Error(_) => Some(f64::NAN),
        Data::String(text) => parse_price(text),
        _ => None,
    }
}

fn parse_price(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || NA_VALUES.contains(&text) {
        return Some(f64::NAN);
    }
    text.parse::<f64>().ok()
}

/// Parse one CSV sheet: header row, date index in the first column.
pub fn read_sheet<R: Read>(reader: R) -> Result<PriceFrame> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| PriceError::Workbook(e.to_string()))?
        .clone();

    if headers.len() < 2 {
        return Err(PriceError::Workbook(
            "sheet needs a date column and at least one price column".to_string(),
        ));
    }

    let names: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
    let mut observations: Vec<Vec<(NaiveDate, f64)>> = vec![Vec::new(); names.len()];

    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| PriceError::Workbook(e.to_string()))?;

        let raw_date = record.get(0).unwrap_or("").trim();
        if raw_date.is_empty() {
            continue;
        }
        let date = parse_sheet_date(raw_date)
            .ok_or_else(|| PriceError::Workbook(format!("row {}: invalid date '{}'", line + 2, raw_date)))?;

        for (col, obs) in observations.iter_mut().enumerate() {
            let cell = record.get(col + 1).unwrap_or("");
            let value = parse_price(cell).ok_or_else(|| {
                PriceError::Workbook(format!(
                    "row {}: invalid price '{}' for {}",
                    line + 2,
                    cell.trim(),
                    names[col]
                ))
            })?;
            obs.push((date, value));
        }
    }

    Ok(PriceFrame::from_observations(
        names.into_iter().zip(observations).collect(),
    ))
}

fn parse_sheet_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}
