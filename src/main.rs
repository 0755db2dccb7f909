// Entry point and high-level CLI flow.
//
// One run is one refresh cycle: load a fresh snapshot, optionally narrow it
// to a WITEL, print the dashboard tables and write any requested exports.
use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use highfive_report::config::{
    COL_CATEGORY, COL_PRODUCT, COL_RESULTS_PCT, DEFAULT_FOCUS_PRODUCT, DEFAULT_SHEET_URL,
};
use highfive_report::output;
use highfive_report::reports;
use highfive_report::source::{FileSource, HttpSource, SheetSource};
use highfive_report::types::SummaryStats;
use highfive_report::util::{format_int, format_percent};
use highfive_report::{load_and_clean, LoadReport, Table, WinLose, Witel};
use log::{info, warn};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tabled::Tabled;

/// Dashboard Monitoring High Five
#[derive(Parser, Debug)]
#[command(name = "highfive-report")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Sheet URL (edit link or direct CSV export link)
    #[arg(long, env = "HIGHFIVE_SHEET_URL", default_value = DEFAULT_SHEET_URL)]
    url: String,

    /// Read a local CSV snapshot instead of fetching the sheet (takes
    /// precedence over --url)
    #[arg(long)]
    file: Option<PathBuf>,

    /// WITEL to report on; omit for the whole sheet
    #[arg(short, long, env = "HIGHFIVE_WITEL")]
    witel: Option<String>,

    /// Fetch timeout in seconds (default 30)
    #[arg(long)]
    timeout: Option<u64>,

    /// PRODUCT HIGH FIVE value shown in the focused win/lose view
    #[arg(long, default_value = DEFAULT_FOCUS_PRODUCT)]
    focus_product: String,

    /// Export the focused product's rows as CSV
    #[arg(long)]
    focus_export: Option<PathBuf>,

    /// Export the filtered rows as CSV
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export the AM / customer / product listing as CSV
    #[arg(long)]
    detail: Option<PathBuf>,

    /// Write the computed metrics as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Rows shown per preview table
    #[arg(long, default_value = "10")]
    rows: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Load the snapshot from the selected source and print load diagnostics.
fn handle_load(cli: &Cli) -> Result<(Table, LoadReport)> {
    let (source, locator): (Box<dyn SheetSource>, String) = match &cli.file {
        Some(path) => (Box::new(FileSource), path.display().to_string()),
        None => (
            Box::new(HttpSource::with_timeout(cli.timeout.map(Duration::from_secs))?),
            cli.url.clone(),
        ),
    };
    let (table, report) =
        load_and_clean(&locator, source.as_ref()).context("Gagal memuat data")?;
    println!(
        "Processing dataset... ({} rows, {} columns, snapshot {})",
        format_int(report.total_rows),
        format_int(report.total_columns),
        report.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if report.coerced_missing > 0 {
        println!(
            "Note: {} numeric cells could not be parsed and count as missing.",
            format_int(report.coerced_missing)
        );
    }
    println!();
    Ok((table, report))
}

fn print_preview<T: Tabled>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize) {
    println!("\n{}", output::render_preview(title, note, rows, max_rows));
}

/// Compute every dashboard view for `table` and print/write them.
fn handle_generate_reports(
    cli: &Cli,
    table: &Table,
    witel: Option<Witel>,
    report: &LoadReport,
) -> Result<()> {
    let overview = reports::overview(table);
    let scope = witel.map(|w| w.to_string()).unwrap_or_else(|| "SEMUA WITEL".to_string());
    println!("DASHBOARD MONITORING HIGH FIVE · {}", scope);
    println!(
        "Records: {} | WITEL: {} | Products: {} | Avg progress: {}",
        format_int(overview.total_records),
        overview.total_witel,
        overview.total_products,
        format_percent(overview.avg_progress)
    );

    let overall = match reports::overall_rate(table) {
        Ok(r) => r,
        Err(e) => {
            warn!("No overall win rate: {}", e);
            WinLose::EMPTY
        }
    };
    println!(
        "Overall win {} / lose {} ({} records)",
        format_percent(Some(overall.win_rate)),
        format_percent(Some(overall.lose_rate)),
        overall.count
    );

    let focus = match reports::product_focus(table, &cli.focus_product) {
        Ok(f) => {
            println!(
                "{}: win {} / lose {} ({} of {} records)",
                f.product,
                format_percent(Some(f.rate.win_rate)),
                format_percent(Some(f.rate.lose_rate)),
                f.rows.len(),
                format_int(table.len())
            );
            print_preview(
                &format!("Detail {}", f.product),
                Some("Sorted by % Results"),
                &output::focus_display_rows(&f.rows),
                cli.rows,
            );
            Some(f)
        }
        Err(e) => {
            warn!("Skipping {} view: {}", cli.focus_product, e);
            None
        }
    };

    let categories =
        match reports::category_metrics(table, COL_CATEGORY, COL_PRODUCT, COL_RESULTS_PCT) {
        Ok(m) => m,
        Err(e) => {
            warn!("Skipping category view: {}", e);
            Vec::new()
        }
    };
    print_preview(
        "Progress Rate per Kategori Produk",
        Some("Win = rata-rata % Results, Lose = 100 - Win"),
        &output::category_display_rows(&categories),
        cli.rows,
    );

    let account_managers = match reports::am_rollup(table) {
        Ok(r) => r,
        Err(e) => {
            warn!("Skipping account manager view: {}", e);
            Vec::new()
        }
    };
    print_preview(
        "Progress Account Manager",
        Some("Sorted by total NILAI"),
        &output::am_display_rows(&account_managers),
        cli.rows,
    );

    let products = match reports::product_summary(table) {
        Ok(p) => p,
        Err(e) => {
            warn!("Skipping product view: {}", e);
            Vec::new()
        }
    };
    print_preview(
        "Summary Per Produk",
        None,
        &output::product_display_rows(&products),
        cli.rows,
    );

    if let Some(path) = &cli.export {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        output::export_csv(table, file).with_context(|| format!("writing {}", path.display()))?;
        info!("Exported {} rows to {}", table.len(), path.display());
    }

    if let Some(path) = &cli.detail {
        let rows = reports::detail_rows(table)?;
        output::write_rows_csv(path, &rows)?;
        info!("Exported {} detail rows to {}", rows.len(), path.display());
    }

    if let (Some(path), Some(f)) = (&cli.focus_export, &focus) {
        output::write_rows_csv(path, &f.rows)?;
        info!("Exported {} {} rows to {}", f.rows.len(), f.product, path.display());
    }

    if let Some(path) = &cli.json {
        let summary = SummaryStats {
            witel: witel.map(|w| w.to_string()),
            fetched_at: report.fetched_at.to_rfc3339(),
            overview,
            overall,
            focus,
            categories,
            account_managers,
            products,
        };
        output::write_summary_json(path, &summary)?;
        info!("Summary written to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let witel = Witel::parse_selection(cli.witel.as_deref().unwrap_or(""))
        .map_err(anyhow::Error::msg)?;

    let (table, report) = handle_load(&cli)?;
    let table = reports::filter_by_witel(&table, witel)?;
    if table.is_empty() {
        if let Some(w) = witel {
            println!("Tidak ada data untuk WITEL: {}", w);
        }
        return Ok(());
    }
    handle_generate_reports(&cli, &table, witel, &report)
}
