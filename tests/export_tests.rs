use highfive_report::config::{COL_NILAI, COL_RESULTS_PCT};
use highfive_report::output::{
    am_display_rows, export_csv, focus_display_rows, render_preview, write_rows_csv,
    write_summary_json,
};
use highfive_report::reports::{am_rollup, detail_rows, filter_by_witel, product_focus};
use highfive_report::{parse_table, Value, Witel};
use pretty_assertions::assert_eq;

const SHEET: &str = "\
WITEL, NILAI ,CUSTOMER_NAME,AM,% Results,% Progress
BALI,1500000,\"PT Satu, Tbk\",Andi,80%,50%
BALI,,PT Dua,Andi,60 %,
SURAMADU,250000.5,PT Tiga,Budi,,10%
";

#[test]
fn test_export_round_trip_preserves_values() {
    let (table, _) = parse_table(SHEET.as_bytes()).unwrap();
    let bali = filter_by_witel(&table, Some(Witel::Bali)).unwrap();

    let mut buf = Vec::new();
    export_csv(&bali, &mut buf).unwrap();
    let (reparsed, _) = parse_table(buf.as_slice()).unwrap();

    assert_eq!(reparsed.len(), bali.len());
    assert_eq!(reparsed.columns(), bali.columns());
    for (a, b) in bali.rows().zip(reparsed.rows()) {
        assert_eq!(a.cells(), b.cells());
    }
}

#[test]
fn test_export_writes_plain_numbers() {
    let (table, _) = parse_table(SHEET.as_bytes()).unwrap();
    let mut buf = Vec::new();
    export_csv(&table, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "WITEL,NILAI,CUSTOMER_NAME,AM,% Results,% Progress");
    assert_eq!(lines[1], "BALI,1500000,\"PT Satu, Tbk\",Andi,80,50");
    assert_eq!(lines[2], "BALI,,PT Dua,Andi,60,");
    assert_eq!(lines[3], "SURAMADU,250000.5,PT Tiga,Budi,,10");
    assert!(lines[1..].iter().all(|l| !l.contains('%')));
}

#[test]
fn test_numeric_columns_survive_export() {
    let (table, _) = parse_table(SHEET.as_bytes()).unwrap();
    let mut buf = Vec::new();
    export_csv(&table, &mut buf).unwrap();
    let (reparsed, _) = parse_table(buf.as_slice()).unwrap();

    let nilai = reparsed.column_index(COL_NILAI).unwrap();
    let results = reparsed.column_index(COL_RESULTS_PCT).unwrap();
    let values: Vec<_> = reparsed.rows().map(|r| r.value(nilai).clone()).collect();
    assert_eq!(
        values,
        vec![Value::Number(1_500_000.0), Value::Missing, Value::Number(250_000.5)]
    );
    let rates: Vec<_> = reparsed.rows().map(|r| r.number(results)).collect();
    assert_eq!(rates, vec![Some(80.0), Some(60.0), None]);
}

#[test]
fn test_summary_json_contains_rollup() {
    let (table, _) = parse_table(SHEET.as_bytes()).unwrap();
    let rollup = am_rollup(&table).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");
    write_summary_json(&path, &rollup).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json[0]["am_name"], "Andi");
    assert_eq!(json[0]["total_value"], 1_500_000.0);
    assert_eq!(json[0]["avg_progress"], 50.0);
    assert_eq!(json[1]["am_name"], "Budi");
    assert_eq!(json[1]["avg_progress"], 10.0);
}

#[test]
fn test_missing_average_serializes_as_null() {
    let (table, _) = parse_table("AM,% Progress\nEko,\nEko,n/a\n".as_bytes()).unwrap();
    let rollup = am_rollup(&table).unwrap();
    let json = serde_json::to_value(&rollup).unwrap();
    assert!(json[0]["avg_progress"].is_null());
    assert_eq!(json[0]["product_count"], 2);
}

#[test]
fn test_am_display_rows_format_for_humans() {
    let (table, _) = parse_table(SHEET.as_bytes()).unwrap();
    let rows = am_display_rows(&am_rollup(&table).unwrap());
    assert_eq!(rows[0].total_value, "Rp 1.500.000");
    assert_eq!(rows[0].avg_progress, "50.0%");
    assert_eq!(rows[0].status, "Sedang Berlangsung");
}

#[test]
fn test_write_rows_csv_uses_field_headers() {
    let (table, _) = parse_table(
        "AM,CUSTOMER_NAME,PRODUCT,NILAI\nBudi,PT Dua,Pijar,500\nAndi,PT Satu,Astinet,\n".as_bytes(),
    )
    .unwrap();
    let rows = detail_rows(&table).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("detail.csv");
    write_rows_csv(&path, &rows).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert_eq!(
        header,
        "am,customer_name,product,nilai,progress_pct,results_pct,status"
    );
    assert_eq!(lines.next().unwrap(), "Andi,PT Satu,Astinet,,,,");
    assert_eq!(lines.next().unwrap(), "Budi,PT Dua,Pijar,500.0,,,");
    assert_eq!(lines.next(), None);
}

#[test]
fn test_write_rows_csv_reports_bad_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("detail.csv");
    let err = write_rows_csv(&path, &[("a", 1)]).unwrap_err();
    assert!(err.to_string().contains("detail.csv"), "{}", err);
}

#[test]
fn test_render_preview_truncates() {
    let (table, _) = parse_table(SHEET.as_bytes()).unwrap();
    let rows = am_display_rows(&am_rollup(&table).unwrap());

    let text = render_preview("Progress Account Manager", Some("Sorted by total NILAI"), &rows, 1);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Progress Account Manager");
    assert_eq!(lines[1], "(Sorted by total NILAI)");
    assert!(text.contains("Andi"));
    assert!(!text.contains("Budi"));
    assert_eq!(*lines.last().unwrap(), "... 1 of 2 rows shown");
}

#[test]
fn test_render_preview_empty() {
    let text = render_preview("Summary Per Produk", None, &focus_display_rows(&[]), 10);
    assert_eq!(text, "Summary Per Produk\n(no rows)\n");
}

#[test]
fn test_focus_display_rows_fill_blanks() {
    let (table, _) = parse_table(
        "PRODUCT HIGH FIVE,CUSTOMER_NAME,NILAI,% Results,Result\nDDoS,PT Satu,,55%,\n".as_bytes(),
    )
    .unwrap();
    let focus = product_focus(&table, "DDoS").unwrap();
    let rows = focus_display_rows(&focus.rows);
    assert_eq!(rows[0].customer_name, "PT Satu");
    assert_eq!(rows[0].nilai, "-");
    assert_eq!(rows[0].results, "55.0%");
    assert_eq!(rows[0].result_status, "-");
}
