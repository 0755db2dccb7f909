use crate::error::OutputError;
use crate::types::{
    AccountManagerSummary, AmDisplayRow, CategoryDisplayRow, CategoryMetric, FocusDisplayRow,
    FocusRow, ProductDisplayRow, ProductSummary, ProgressBand, Table, Value,
};
use crate::util::{format_percent, format_rupiah};
use serde::Serialize;
use std::cmp::Ordering;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table as TextTable, Tabled};

/// Write `table` as comma-separated text.
///
/// Numbers are written unformatted (no thousands separators, no `%`), and
/// missing cells are left empty, so the output parses back to the same
/// values.
pub fn export_csv<W: Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.cells().iter().map(cell_to_field))?;
    }
    wtr.flush()?;
    Ok(())
}

fn cell_to_field(v: &Value) -> String {
    match v {
        Value::Missing => String::new(),
        Value::Text(s) => s.clone(),
        Value::Number(n) => n.to_string(),
    }
}

/// Serialize report rows (one struct per line, header from field names) to
/// `path`.
pub fn write_rows_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    let mut wtr = csv::Writer::from_writer(file);
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|source| io_error(path, source))
}

/// Pretty-printed JSON document at `path`.
pub fn write_summary_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> OutputError {
    OutputError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Render the first `max_rows` rows as a markdown table under a heading.
pub fn render_preview<T: Tabled>(
    title: &str,
    note: Option<&str>,
    rows: &[T],
    max_rows: usize,
) -> String {
    let mut out = format!("{}\n", title);
    if let Some(n) = note {
        out.push_str(&format!("({})\n", n));
    }
    if rows.is_empty() {
        out.push_str("(no rows)\n");
        return out;
    }
    let shown = &rows[..rows.len().min(max_rows)];
    out.push_str(&TextTable::new(shown).with(Style::markdown()).to_string());
    out.push('\n');
    if shown.len() < rows.len() {
        out.push_str(&format!("... {} of {} rows shown\n", shown.len(), rows.len()));
    }
    out
}

pub fn category_display_rows(metrics: &[CategoryMetric]) -> Vec<CategoryDisplayRow> {
    metrics
        .iter()
        .map(|m| {
            let top_product = m
                .product_breakdown
                .iter()
                .max_by(|a, b| {
                    a.1.avg_result
                        .partial_cmp(&b.1.avg_result)
                        .unwrap_or(Ordering::Equal)
                })
                .map(|(name, share)| format!("{} ({:.1}%)", name, share.avg_result))
                .unwrap_or_else(|| "-".to_string());
            CategoryDisplayRow {
                category: m.category.clone(),
                records: m.record_count,
                win_rate: format_percent(Some(m.win_rate)),
                lose_rate: format_percent(Some(m.lose_rate)),
                top_product,
            }
        })
        .collect()
}

pub fn am_display_rows(rows: &[AccountManagerSummary]) -> Vec<AmDisplayRow> {
    rows.iter()
        .map(|r| AmDisplayRow {
            am: r.am_name.clone(),
            customers: r.distinct_customer_count,
            products: r.product_count,
            total_value: format_rupiah(Some(r.total_value)),
            avg_progress: format_percent(r.avg_progress),
            status: ProgressBand::classify(r.avg_progress).label().to_string(),
        })
        .collect()
}

pub fn product_display_rows(rows: &[ProductSummary]) -> Vec<ProductDisplayRow> {
    rows.iter()
        .map(|r| ProductDisplayRow {
            product: r.product.clone(),
            count: r.count,
            total_value: format_rupiah(Some(r.total_value)),
            avg_results: format_percent(r.avg_results),
            avg_progress: format_percent(r.avg_progress),
        })
        .collect()
}

pub fn focus_display_rows(rows: &[FocusRow]) -> Vec<FocusDisplayRow> {
    rows.iter()
        .map(|r| FocusDisplayRow {
            customer_name: r.customer_name.clone(),
            am: r.am.clone(),
            nilai: r
                .nilai
                .map(|v| format_rupiah(Some(v)))
                .unwrap_or_else(|| "-".to_string()),
            progress: format_percent(r.progress_pct),
            results: format_percent(r.results_pct),
            result_status: r.result_status.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}
