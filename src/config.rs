// Constants shared by the loader, the aggregations and the CLI.
use std::time::Duration;

/// Sheet the dashboard reads when no `--url`/`--file` is given.
pub const DEFAULT_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/1QazP2uYyoPNZU8qfJuAevHFyJP0SmaSwYSc7JXTchCo/edit?usp=sharing";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// Header names as they appear in the sheet (after trimming).
pub const COL_WITEL: &str = "WITEL";
pub const COL_PRODUCT_HIGH_FIVE: &str = "PRODUCT HIGH FIVE";
pub const COL_PRODUCT: &str = "PRODUCT";
pub const COL_CATEGORY: &str = "Kategori Product High Five";
pub const COL_CUSTOMER: &str = "CUSTOMER_NAME";
pub const COL_AM: &str = "AM";
pub const COL_NILAI: &str = "NILAI";
pub const COL_PROGRESS_PCT: &str = "% Progress";
pub const COL_RESULTS_PCT: &str = "% Results";
pub const COL_PROGRESS_STATUS: &str = "Progress";
pub const COL_RESULT_STATUS: &str = "Result";

/// Product given its own win/lose card and detail listing.
pub const DEFAULT_FOCUS_PRODUCT: &str = "Astinet Bundling DDoS";

/// Columns coerced to plain numbers.
pub const NUMERIC_COLUMNS: &[&str] = &[COL_NILAI];

/// Columns stored as `"80%"`-style strings; the `%` is stripped before coercion.
pub const PERCENT_COLUMNS: &[&str] = &[COL_PROGRESS_PCT, COL_RESULTS_PCT];

pub const WITEL_LABELS: &[&str] = &[
    "JATIM BARAT",
    "YOGYA JATENG SELATAN",
    "SEMARANG JATENG UTARA",
    "SURAMADU",
    "BALI",
    "NUSA TENGGARA",
    "JATIM TIMUR",
    "SOLO JATENG TIMUR",
];

/// Region selector value meaning "no WITEL chosen".
pub const NO_WITEL_SELECTED: &str = "-- Pilih Witel --";

/// Label used for rows whose grouping key is empty.
pub const MISSING_LABEL: &str = "-";
