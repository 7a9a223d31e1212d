//! Load the trade statistics sheet into validated [`TradeRecord`]s.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ xlsx / csv   │────▶│   RawTable   │────▶│ column check │────▶│   Dataset    │
//! │              │     │ (cells)      │     │ (fatal)      │     │ (clean rows) │
//! └──────────────┘     └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Rows with no Partner, Quantity or Trade Value, or with a TradeFlow other
//! than exactly `Export`/`Import`, are dropped silently and only counted.
//! Reporter and Partner are trimmed; TradeFlow is compared as written.
//! Missing columns, a missing sheet, an unreadable file or a number too large
//! for a decimal fail the whole load.

pub mod delimited;
pub mod sheet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{LoadError, LoadResult, SelectionError};
use crate::models::{Selection, TradeFlow, TradeRecord};

/// Column names agreed with the data provider.
pub mod columns {
    pub const REPORTER: &str = "Reporter";
    pub const PARTNER: &str = "Partner";
    pub const QUANTITY: &str = "Quantity";
    pub const TRADE_VALUE: &str = "Trade Value 1000USD";
    pub const TRADE_FLOW: &str = "TradeFlow";
}

// =============================================================================
// Raw tables
// =============================================================================

/// One cell as read from the source, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Non-empty string content, trimmed.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// Numeric content. Text that is not a number is missing; a number the
    /// decimal type cannot hold is an error.
    pub fn as_decimal(&self) -> Result<Option<Decimal>, OutOfRange> {
        let (n, raw) = match self {
            Cell::Empty => return Ok(None),
            Cell::Text(s) => {
                let raw = s.trim();
                if let Some(d) = parse_decimal(raw) {
                    return Ok(Some(d));
                }
                match raw.parse::<f64>() {
                    Ok(n) if n.is_finite() => (n, raw.to_string()),
                    _ => return Ok(None),
                }
            }
            Cell::Number(n) if n.is_finite() => (*n, n.to_string()),
            Cell::Number(_) => return Ok(None),
        };

        // Shortest round-trip text keeps 0.1 as 0.1 instead of its binary expansion
        parse_decimal(&n.to_string())
            .or_else(|| Decimal::from_f64_retain(n))
            .map(Some)
            .ok_or(OutOfRange(raw))
    }
}

/// Raw text of a number outside the decimal range.
#[derive(Debug, Clone, PartialEq)]
pub struct OutOfRange(pub String);

fn parse_decimal(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Header row plus data rows, whatever the source format.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Detected text encoding (delimited sources only).
    pub encoding: Option<String>,
    /// Detected delimiter (delimited sources only).
    pub delimiter: Option<char>,
}

// =============================================================================
// Sources
// =============================================================================

/// How a source file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Spreadsheet,
    Delimited,
}

impl SourceFormat {
    /// Pick the reader from the file extension. Anything unrecognised is
    /// handed to the workbook reader, which reports a precise error.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("csv" | "tsv" | "txt") => SourceFormat::Delimited,
            _ => SourceFormat::Spreadsheet,
        }
    }
}

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
    /// Sheet holding the records (workbooks only).
    pub sheet: String,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }

    pub fn format(&self) -> SourceFormat {
        SourceFormat::from_path(&self.path)
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// What happened during a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub source: PathBuf,
    pub format: SourceFormat,
    pub sheet: Option<String>,
    pub encoding: Option<String>,
    pub delimiter: Option<String>,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    pub loaded_at: DateTime<Utc>,
}

/// The validated, immutable table every request works from.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<TradeRecord>,
    countries: Vec<String>,
    report: LoadReport,
}

impl Dataset {
    /// Build from already-validated records (no file involved).
    pub fn from_records(records: Vec<TradeRecord>) -> Self {
        let report = LoadReport {
            source: PathBuf::new(),
            format: SourceFormat::Delimited,
            sheet: None,
            encoding: None,
            delimiter: None,
            rows_read: records.len(),
            rows_kept: records.len(),
            rows_dropped: 0,
            loaded_at: Utc::now(),
        };
        Self::with_report(records, report)
    }

    fn with_report(records: Vec<TradeRecord>, report: LoadReport) -> Self {
        let countries: BTreeSet<&str> = records.iter().map(|r| r.country.as_str()).collect();
        let countries = countries.into_iter().map(String::from).collect();
        Self {
            records,
            countries,
            report,
        }
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Distinct reporting countries, ascending byte order.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Reject countries that never appear as a reporter.
    pub fn validate_selection(&self, selection: &Selection) -> Result<(), SelectionError> {
        for country in selection.countries() {
            if self.countries.binary_search(country).is_err() {
                return Err(SelectionError::UnknownCountry(country.clone()));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Positions of the required columns in the header row.
struct ColumnIndex {
    reporter: usize,
    partner: usize,
    quantity: usize,
    trade_value: usize,
    trade_flow: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> LoadResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            reporter: find(columns::REPORTER)?,
            partner: find(columns::PARTNER)?,
            quantity: find(columns::QUANTITY)?,
            trade_value: find(columns::TRADE_VALUE)?,
            trade_flow: find(columns::TRADE_FLOW)?,
        })
    }

    /// Turn one row into a record, or `None` when it fails the row filters.
    fn record(&self, line: usize, row: &[Cell]) -> LoadResult<Option<TradeRecord>> {
        let cell = |i: usize| row.get(i).unwrap_or(&Cell::Empty);
        let number = |i: usize, column: &'static str| {
            cell(i)
                .as_decimal()
                .map_err(|OutOfRange(value)| LoadError::NumberOutOfRange {
                    column,
                    row: line,
                    value,
                })
        };

        // matched as written, padding included
        let trade_flow = match cell(self.trade_flow) {
            Cell::Text(s) => TradeFlow::parse(s),
            _ => None,
        };
        let (Some(trade_flow), Some(country), Some(partner)) = (
            trade_flow,
            cell(self.reporter).as_text(),
            cell(self.partner).as_text(),
        ) else {
            return Ok(None);
        };

        let quantity = number(self.quantity, columns::QUANTITY)?;
        let trade_value = number(self.trade_value, columns::TRADE_VALUE)?;
        let (Some(quantity), Some(trade_value)) = (quantity, trade_value) else {
            return Ok(None);
        };

        Ok(Some(TradeRecord {
            country,
            partner,
            trade_flow,
            quantity,
            trade_value,
        }))
    }
}

/// Validate a raw table: check the column contract, then filter rows.
pub fn clean_table(table: RawTable, source: &DataSource) -> LoadResult<Dataset> {
    let index = ColumnIndex::resolve(&table.headers)?;

    let rows_read = table.rows.len();
    let mut records = Vec::with_capacity(rows_read);
    for (i, row) in table.rows.iter().enumerate() {
        if let Some(record) = index.record(i + 1, row)? {
            records.push(record);
        }
    }

    let format = source.format();
    let report = LoadReport {
        source: source.path.clone(),
        format,
        sheet: (format == SourceFormat::Spreadsheet).then(|| source.sheet.clone()),
        encoding: table.encoding,
        delimiter: table.delimiter.map(|d| d.to_string()),
        rows_read,
        rows_kept: records.len(),
        rows_dropped: rows_read - records.len(),
        loaded_at: Utc::now(),
    };

    Ok(Dataset::with_report(records, report))
}

/// Read and validate the dataset. Every error is fatal.
pub fn load(source: &DataSource) -> LoadResult<Dataset> {
    log_info(format!("📖 Reading {}...", source.path.display()));

    let table = match source.format() {
        SourceFormat::Spreadsheet => {
            log_info(format!("Sheet: {}", source.sheet));
            sheet::read_sheet(&source.path, &source.sheet)?
        }
        SourceFormat::Delimited => {
            let table = delimited::read_csv_file(&source.path)?;
            if let Some(ref encoding) = table.encoding {
                log_success(format!("Detected encoding: {}", encoding));
            }
            table
        }
    };

    let dataset = clean_table(table, source)?;
    let report = dataset.report();

    log_success(format!("Read {} rows", report.rows_read));
    if report.rows_dropped > 0 {
        log_warning(format!(
            "{} rows dropped (missing partner, quantity or value, or unknown trade flow)",
            report.rows_dropped
        ));
    }
    log_success(format!(
        "{} records from {} reporting countries",
        report.rows_kept,
        dataset.countries().len()
    ));

    Ok(dataset)
}
