use calamine::{Data, Reader};
use chrono::{Days, NaiveDate};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

use crate::decode::decode_text;

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Spreadsheet error: {0}")]
    Excel(#[from] calamine::Error),
    #[error("Workbook has no worksheets")]
    NoWorksheet,
    #[error("No header row")]
    NoHeader,
}

/// A header row and data rows of trimmed string cells.
///
/// Rows may be shorter or longer than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Self, DatasetError> {
        let (text, encoding) = decode_text(bytes);
        let delimiter = sniff_delimiter(&text);
        debug!(%encoding, delimiter = %char::from(delimiter), "decoded delimited text");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(String::is_empty) {
            return Err(DatasetError::NoHeader);
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// First worksheet; its first non-empty row is the header.
    pub fn from_excel(bytes: &[u8]) -> Result<Self, DatasetError> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(DatasetError::NoWorksheet)?;
        let range = workbook.worksheet_range(&sheet)?;
        debug!(%sheet, rows = range.height(), "reading worksheet");

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|c| !c.is_empty()));

        let headers = rows.next().ok_or(DatasetError::NoHeader)?;
        Ok(Self {
            headers,
            rows: rows.collect(),
        })
    }
}

pub(crate) fn sample_column(rows: &[Vec<String>], column: usize, limit: usize) -> Vec<&str> {
    rows.iter()
        .filter_map(|r| r.get(column))
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .take(limit)
        .collect()
}

/// The candidate delimiter seen most often, outside quotes, on the first non-blank line.
fn sniff_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; DELIMITERS.len()];
    let mut quoted = false;
    for b in line.bytes() {
        if b == b'"' {
            quoted = !quoted;
        } else if !quoted {
            if let Some(i) = DELIMITERS.iter().position(|d| *d == b) {
                counts[i] += 1;
            }
        }
    }

    DELIMITERS
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .max_by_key(|(_, n)| *n)
        .map(|(d, _)| *d)
        .unwrap_or(b',')
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Excel serial day numbers count from 1899-12-30.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_days(Days::new(serial.trunc() as u64))
}
