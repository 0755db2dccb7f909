use crate::config::{NO_WITEL_SELECTED, WITEL_LABELS};
use crate::error::AggregationError;
use crate::util::parse_percent_safe;
use serde::Serialize;
use tabled::Tabled;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One cell of the normalized table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Text(String),
    Number(f64),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

static MISSING: Value = Value::Missing;

/// Header-driven table: `columns[i]` names the i-th cell of every row.
///
/// Rows are padded with `Value::Missing` so every row has exactly
/// `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, Value::Missing);
                r
            })
            .collect();
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of `name`; the first match wins if a header repeats.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index`, but a missing column is a precondition failure.
    pub fn require(&self, name: &str) -> Result<usize, AggregationError> {
        self.column_index(name)
            .ok_or_else(|| AggregationError::missing(name))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(|cells| Row { cells: cells.as_slice() })
    }

    /// New table with the rows for which `keep` returns true.
    pub fn filter<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Row<'_>) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|cells| keep(&Row { cells: cells.as_slice() }))
            .cloned()
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// Borrowed view of one table row; cells are addressed by column index.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [Value],
}

impl<'a> Row<'a> {
    pub fn cells(&self) -> &'a [Value] {
        self.cells
    }

    pub fn value(&self, idx: usize) -> &'a Value {
        self.cells.get(idx).unwrap_or(&MISSING)
    }

    pub fn text(&self, idx: usize) -> Option<&'a str> {
        self.value(idx).as_text()
    }

    pub fn number(&self, idx: usize) -> Option<f64> {
        self.value(idx).as_number()
    }

    /// Numeric reading of a rate column. Columns the loader did not coerce
    /// hold text, so `"80%"`-style cells are parsed here.
    pub fn percent(&self, idx: usize) -> Option<f64> {
        match self.value(idx) {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_percent_safe(Some(s)),
            Value::Missing => None,
        }
    }

    /// Text cell at an optional column; absent columns read as missing.
    pub fn text_opt(&self, idx: Option<usize>) -> Option<&'a str> {
        idx.and_then(|i| self.text(i))
    }

    pub fn number_opt(&self, idx: Option<usize>) -> Option<f64> {
        idx.and_then(|i| self.number(i))
    }
}

/// Regional business units the dashboard can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Witel {
    JatimBarat,
    YogyaJatengSelatan,
    SemarangJatengUtara,
    Suramadu,
    Bali,
    NusaTenggara,
    JatimTimur,
    SoloJatengTimur,
}

impl Witel {
    pub const ALL: [Witel; 8] = [
        Witel::JatimBarat,
        Witel::YogyaJatengSelatan,
        Witel::SemarangJatengUtara,
        Witel::Suramadu,
        Witel::Bali,
        Witel::NusaTenggara,
        Witel::JatimTimur,
        Witel::SoloJatengTimur,
    ];

    pub fn label(self) -> &'static str {
        WITEL_LABELS[self as usize]
    }

    /// Parse a region selector value. The "no selection" sentinel (or an
    /// empty string) yields `Ok(None)`.
    pub fn parse_selection(s: &str) -> Result<Option<Witel>, String> {
        let s = s.trim();
        if s.is_empty() || s == NO_WITEL_SELECTED {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl fmt::Display for Witel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Witel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Witel::ALL
            .iter()
            .copied()
            .find(|w| w.label() == wanted)
            .ok_or_else(|| format!("unknown WITEL: {}", s.trim()))
    }
}

/// Progress bands used to colour and label progress values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressBand {
    NotStarted,
    NeedsAttention,
    JustStarted,
    InProgress,
    NearlyDone,
}

impl ProgressBand {
    pub fn classify(progress: Option<f64>) -> Self {
        match progress {
            None => ProgressBand::NotStarted,
            Some(p) if p >= 75.0 => ProgressBand::NearlyDone,
            Some(p) if p >= 50.0 => ProgressBand::InProgress,
            Some(p) if p >= 25.0 => ProgressBand::JustStarted,
            Some(_) => ProgressBand::NeedsAttention,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgressBand::NotStarted => "Belum Dimulai",
            ProgressBand::NeedsAttention => "Perlu Perhatian",
            ProgressBand::JustStarted => "Baru Dimulai",
            ProgressBand::InProgress => "Sedang Berlangsung",
            ProgressBand::NearlyDone => "Hampir Selesai",
        }
    }
}

/// Win/lose split for a set of rows. `lose_rate` is always `100 - win_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinLose {
    pub win_rate: f64,
    pub lose_rate: f64,
    pub count: usize,
}

impl WinLose {
    pub const EMPTY: WinLose = WinLose {
        win_rate: 0.0,
        lose_rate: 100.0,
        count: 0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductShare {
    pub count: usize,
    pub percentage: f64,
    pub avg_result: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMetric {
    pub category: String,
    pub win_rate: f64,
    pub lose_rate: f64,
    pub record_count: usize,
    pub product_breakdown: BTreeMap<String, ProductShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountManagerSummary {
    pub am_name: String,
    pub distinct_customer_count: usize,
    pub product_count: usize,
    pub total_value: f64,
    /// `None` when no row of this AM carries a progress value.
    pub avg_progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerProduct {
    pub product: String,
    pub nilai: Option<f64>,
    pub progress_pct: Option<f64>,
    pub results_pct: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDetail {
    pub customer_name: String,
    pub total_value: f64,
    pub products: Vec<CustomerProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product: String,
    pub count: usize,
    pub total_value: f64,
    pub avg_results: Option<f64>,
    pub avg_progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    pub total_records: usize,
    pub total_witel: usize,
    pub total_products: usize,
    pub avg_progress: Option<f64>,
}

/// One row of the single-product focus listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusRow {
    pub customer_name: String,
    pub am: String,
    pub nilai: Option<f64>,
    pub progress_pct: Option<f64>,
    pub results_pct: Option<f64>,
    pub result_status: Option<String>,
}

/// Win/lose card and detail rows for one `PRODUCT HIGH FIVE` product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductFocus {
    pub product: String,
    pub rate: WinLose,
    /// Best `% Results` first; rows without a result go last.
    pub rows: Vec<FocusRow>,
}

/// One line of the flat AM/customer/product listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub am: String,
    pub customer_name: String,
    pub product: String,
    pub nilai: Option<f64>,
    pub progress_pct: Option<f64>,
    pub results_pct: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub witel: Option<String>,
    pub fetched_at: String,
    pub overview: OverviewStats,
    pub overall: WinLose,
    pub focus: Option<ProductFocus>,
    pub categories: Vec<CategoryMetric>,
    pub account_managers: Vec<AccountManagerSummary>,
    pub products: Vec<ProductSummary>,
}

// Display rows for console previews. Values here are already formatted.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryDisplayRow {
    #[tabled(rename = "Kategori")]
    pub category: String,
    #[tabled(rename = "Records")]
    pub records: usize,
    #[tabled(rename = "Win")]
    pub win_rate: String,
    #[tabled(rename = "Lose")]
    pub lose_rate: String,
    #[tabled(rename = "Top Product")]
    pub top_product: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AmDisplayRow {
    #[tabled(rename = "Account Manager")]
    pub am: String,
    #[tabled(rename = "Customers")]
    pub customers: usize,
    #[tabled(rename = "Products")]
    pub products: usize,
    #[tabled(rename = "Total Nilai")]
    pub total_value: String,
    #[tabled(rename = "Avg Progress")]
    pub avg_progress: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProductDisplayRow {
    #[tabled(rename = "Product High Five")]
    pub product: String,
    #[tabled(rename = "Jumlah")]
    pub count: usize,
    #[tabled(rename = "Total Nilai")]
    pub total_value: String,
    #[tabled(rename = "Avg Results")]
    pub avg_results: String,
    #[tabled(rename = "Avg Progress")]
    pub avg_progress: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FocusDisplayRow {
    #[tabled(rename = "Customer Name")]
    pub customer_name: String,
    #[tabled(rename = "Account Manager")]
    pub am: String,
    #[tabled(rename = "Nilai Kontrak")]
    pub nilai: String,
    #[tabled(rename = "% Progress")]
    pub progress: String,
    #[tabled(rename = "% Results")]
    pub results: String,
    #[tabled(rename = "Result")]
    pub result_status: String,
}
