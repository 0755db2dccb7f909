use highfive_report::config::{COL_NILAI, COL_RESULTS_PCT, COL_WITEL};
use highfive_report::source::{FileSource, SheetSource};
use highfive_report::{load, load_and_clean, parse_table, LoadError, Value};
use pretty_assertions::assert_eq;
use std::io::Write;

/// In-memory source that records the address it was asked to fetch.
struct StaticSource {
    body: Result<String, LoadError>,
    fetched: std::cell::RefCell<Option<String>>,
}

impl StaticSource {
    fn ok(body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
            fetched: Default::default(),
        }
    }

    fn failing(detail: &str) -> Self {
        Self {
            body: Err(LoadError::fetch(detail)),
            fetched: Default::default(),
        }
    }
}

impl SheetSource for StaticSource {
    fn resolve(&self, locator: &str) -> Result<String, LoadError> {
        highfive_report::source::resolve_locator(locator)
    }

    fn fetch(&self, resolved: &str) -> Result<String, LoadError> {
        *self.fetched.borrow_mut() = Some(resolved.to_string());
        self.body.clone()
    }
}

const SAMPLE: &str = "\
WITEL, NILAI ,% Results,% Progress,AM
BALI,1500000,80%,50 %,Andi
BALI,abc,60%,,Budi
JATIM BARAT,,NaN,n/a,
";

#[test]
fn test_headers_are_trimmed_and_columns_coerced() {
    let (table, report) = parse_table(SAMPLE.as_bytes()).unwrap();

    assert_eq!(
        table.columns(),
        &["WITEL", "NILAI", "% Results", "% Progress", "AM"]
    );
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.total_columns, 5);

    let nilai = table.column_index(COL_NILAI).unwrap();
    let results = table.column_index(COL_RESULTS_PCT).unwrap();
    let rows: Vec<_> = table.rows().collect();

    assert_eq!(rows[0].number(nilai), Some(1_500_000.0));
    assert_eq!(rows[0].number(results), Some(80.0));
    assert_eq!(rows[0].number(3), Some(50.0));
    assert!(rows[1].value(nilai).is_missing());
    assert_eq!(rows[1].number(results), Some(60.0));
    assert!(rows[2].value(results).is_missing());
    assert!(rows[2].value(4).is_missing());
}

#[test]
fn test_unparsable_cells_are_counted_not_fatal() {
    let (_, report) = parse_table(SAMPLE.as_bytes()).unwrap();
    // "abc", "NaN" and "n/a"; blank cells are not counted.
    assert_eq!(report.coerced_missing, 3);
}

#[test]
fn test_text_cells_are_kept_verbatim() {
    let (table, _) = parse_table(SAMPLE.as_bytes()).unwrap();
    let witel = table.column_index(COL_WITEL).unwrap();
    let labels: Vec<_> = table.rows().map(|r| r.text(witel)).collect();
    assert_eq!(labels, vec![Some("BALI"), Some("BALI"), Some("JATIM BARAT")]);
}

#[test]
fn test_short_rows_are_padded_with_missing() {
    let csv = "WITEL,AM,NILAI\nBALI\n";
    let (table, _) = parse_table(csv.as_bytes()).unwrap();
    let row = table.rows().next().unwrap();
    assert_eq!(row.cells().len(), 3);
    assert_eq!(row.value(1), &Value::Missing);
    assert_eq!(row.value(2), &Value::Missing);
}

#[test]
fn test_absent_optional_columns_are_not_an_error() {
    let (table, _) = parse_table("WITEL,AM\nBALI,Andi\n".as_bytes()).unwrap();
    assert!(!table.has_column(COL_NILAI));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_empty_body_is_fetch_failure() {
    let err = parse_table("".as_bytes()).unwrap_err();
    assert!(matches!(err, LoadError::FetchFailure { .. }));
}

#[test]
fn test_malformed_csv_is_fetch_failure() {
    // Invalid UTF-8 in a record.
    let bytes: &[u8] = b"WITEL,AM\nBALI,\xff\xfe\n";
    let err = parse_table(bytes).unwrap_err();
    assert!(matches!(err, LoadError::FetchFailure { .. }));
}

#[test]
fn test_load_resolves_edit_url_before_fetching() {
    let source = StaticSource::ok(SAMPLE);
    let table = load(
        "https://docs.google.com/spreadsheets/d/sheet42/edit?usp=sharing",
        &source,
    )
    .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(
        source.fetched.borrow().as_deref(),
        Some("https://docs.google.com/spreadsheets/d/sheet42/export?format=csv")
    );
}

#[test]
fn test_load_rejects_bad_locator_without_fetching() {
    let source = StaticSource::ok(SAMPLE);
    let err = load("docs.google.com/whatever", &source).unwrap_err();
    assert!(matches!(err, LoadError::InvalidLocator(_)));
    assert!(source.fetched.borrow().is_none());
}

#[test]
fn test_load_propagates_fetch_failure() {
    let source = StaticSource::failing("connection refused");
    let err = load("https://example.com/sheet.csv", &source).unwrap_err();
    assert_eq!(
        err,
        LoadError::FetchFailure {
            detail: "connection refused".to_string()
        }
    );
}

#[test]
fn test_file_source_reads_snapshot() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let path = file.path().to_string_lossy().to_string();
    let (table, report) = load_and_clean(&path, &FileSource).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(report.total_rows, 3);
}

#[test]
fn test_file_source_missing_file_is_fetch_failure() {
    let err = load("/definitely/not/here.csv", &FileSource).unwrap_err();
    assert!(matches!(err, LoadError::FetchFailure { .. }));
}
