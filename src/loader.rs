use crate::config::{NUMERIC_COLUMNS, PERCENT_COLUMNS};
use crate::error::LoadError;
use crate::source::SheetSource;
use crate::types::{Table, Value};
use crate::util::{parse_f64_safe, parse_percent_safe};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::io::Read;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Non-empty numeric/percentage cells that failed coercion.
    pub coerced_missing: usize,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Text,
    Numeric,
    Percent,
}

fn column_kind(name: &str) -> ColumnKind {
    if NUMERIC_COLUMNS.contains(&name) {
        ColumnKind::Numeric
    } else if PERCENT_COLUMNS.contains(&name) {
        ColumnKind::Percent
    } else {
        ColumnKind::Text
    }
}

/// Resolve `locator`, fetch it once through `source` and normalize it.
pub fn load(locator: &str, source: &dyn SheetSource) -> Result<Table, LoadError> {
    load_and_clean(locator, source).map(|(table, _)| table)
}

pub fn load_and_clean(
    locator: &str,
    source: &dyn SheetSource,
) -> Result<(Table, LoadReport), LoadError> {
    let resolved = source.resolve(locator)?;
    let body = source.fetch(&resolved)?;
    parse_table(body.as_bytes())
}

/// Parse CSV text into a normalized table. The first record is the header.
///
/// Header names are trimmed. Designated numeric columns are coerced to
/// numbers and percentage columns have `%` stripped first; cells that still
/// fail to parse become `Value::Missing`. Empty text cells are missing too.
pub fn parse_table<R: Read>(reader: R) -> Result<(Table, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(LoadError::fetch("no columns to parse from sheet"));
    }
    let kinds: Vec<ColumnKind> = columns.iter().map(|c| column_kind(c)).collect();
    for (name, kind) in columns.iter().zip(&kinds) {
        if *kind != ColumnKind::Text {
            debug!("Column '{}' normalized as {:?}", name, kind);
        }
    }

    let mut coerced_missing = 0usize;
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut cells = Vec::with_capacity(columns.len());
        for (idx, kind) in kinds.iter().enumerate() {
            let raw = record.get(idx);
            let blank = raw.map_or(true, |s| s.trim().is_empty());
            let value = match kind {
                ColumnKind::Text if blank => Value::Missing,
                ColumnKind::Text => Value::Text(raw.unwrap_or_default().to_string()),
                ColumnKind::Numeric => to_number(parse_f64_safe(raw), blank, &mut coerced_missing),
                ColumnKind::Percent => {
                    to_number(parse_percent_safe(raw), blank, &mut coerced_missing)
                }
            };
            cells.push(value);
        }
        rows.push(cells);
    }

    if coerced_missing > 0 {
        warn!("{} numeric cells could not be parsed and are treated as missing", coerced_missing);
    }
    let report = LoadReport {
        total_rows: rows.len(),
        total_columns: columns.len(),
        coerced_missing,
        fetched_at: Utc::now(),
    };
    info!("Loaded {} rows x {} columns", report.total_rows, report.total_columns);
    Ok((Table::new(columns, rows), report))
}

fn to_number(parsed: Option<f64>, blank: bool, coerced_missing: &mut usize) -> Value {
    match parsed {
        Some(v) => Value::Number(v),
        None => {
            if !blank {
                *coerced_missing += 1;
            }
            Value::Missing
        }
    }
}
