use crate::config::{
    COL_AM, COL_CUSTOMER, COL_NILAI, COL_PRODUCT, COL_PRODUCT_HIGH_FIVE, COL_PROGRESS_PCT,
    COL_PROGRESS_STATUS, COL_RESULTS_PCT, COL_RESULT_STATUS, COL_WITEL, MISSING_LABEL,
};
use crate::error::AggregationError;
use crate::types::{
    AccountManagerSummary, CategoryMetric, CustomerDetail, CustomerProduct, DetailRow, FocusRow,
    OverviewStats, ProductFocus, ProductShare, ProductSummary, Row, Table, WinLose, Witel,
};
use crate::util::{mean_present, sum_present};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Rows of `table` whose WITEL equals `witel`; `None` keeps every row.
pub fn filter_by_witel(table: &Table, witel: Option<Witel>) -> Result<Table, AggregationError> {
    let Some(witel) = witel else {
        return Ok(table.clone());
    };
    let idx = table.require(COL_WITEL)?;
    let filtered = table.filter(|r| r.text(idx) == Some(witel.label()));
    if filtered.is_empty() {
        log::warn!("No rows for WITEL {}", witel);
    }
    Ok(filtered)
}

fn win_lose<'a, I>(rows: I, result_idx: usize) -> WinLose
where
    I: IntoIterator<Item = Row<'a>>,
{
    let mut count = 0usize;
    let mut results = Vec::new();
    for r in rows {
        count += 1;
        results.push(r.percent(result_idx));
    }
    match mean_present(results) {
        Some(win_rate) => WinLose {
            win_rate,
            lose_rate: 100.0 - win_rate,
            count,
        },
        None => WinLose::EMPTY,
    }
}

/// Win/lose split for one category.
///
/// `win_rate` is the mean `% Results` over matching rows that have a value;
/// `count` is every matching row, with or without a result. A category
/// with no usable result yields `WinLose::EMPTY`.
pub fn category_rate(
    table: &Table,
    category_key: &str,
    category_value: &str,
) -> Result<WinLose, AggregationError> {
    category_rate_by(table, category_key, category_value, COL_RESULTS_PCT)
}

/// `category_rate` over an arbitrary result column.
pub fn category_rate_by(
    table: &Table,
    category_key: &str,
    category_value: &str,
    result_key: &str,
) -> Result<WinLose, AggregationError> {
    let cat_idx = table.require(category_key)?;
    let res_idx = table.require(result_key)?;
    Ok(win_lose(
        table.rows().filter(|r| r.text(cat_idx) == Some(category_value)),
        res_idx,
    ))
}

/// Win/lose split over the whole table.
pub fn overall_rate(table: &Table) -> Result<WinLose, AggregationError> {
    let res_idx = table.require(COL_RESULTS_PCT)?;
    Ok(win_lose(table.rows(), res_idx))
}

/// Distinct non-missing labels of `key`, in first-seen order.
pub fn categories(table: &Table, key: &str) -> Result<Vec<String>, AggregationError> {
    let idx = table.require(key)?;
    let mut seen = HashSet::new();
    Ok(table
        .rows()
        .filter_map(|r| r.text(idx))
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect())
}

/// Per-product share and mean result inside one category.
///
/// Rows with an empty product name are grouped under `MISSING_LABEL` so
/// the percentages of a non-empty category always add up to 100.
pub fn product_breakdown(
    table: &Table,
    category_key: &str,
    category_value: &str,
    product_key: &str,
    result_key: &str,
) -> Result<BTreeMap<String, ProductShare>, AggregationError> {
    let cat_idx = table.require(category_key)?;
    let prod_idx = table.require(product_key)?;
    let res_idx = table.require(result_key)?;

    let mut groups: HashMap<&str, Vec<Option<f64>>> = HashMap::new();
    let mut total = 0usize;
    for r in table.rows().filter(|r| r.text(cat_idx) == Some(category_value)) {
        total += 1;
        let product = r.text(prod_idx).unwrap_or(MISSING_LABEL);
        groups.entry(product).or_default().push(r.percent(res_idx));
    }

    Ok(groups
        .into_iter()
        .map(|(product, results)| {
            let count = results.len();
            let share = ProductShare {
                count,
                percentage: count as f64 / total as f64 * 100.0,
                avg_result: mean_present(results).unwrap_or(0.0),
            };
            (product.to_string(), share)
        })
        .collect())
}

/// Rate plus product breakdown for every category, in first-seen order.
pub fn category_metrics(
    table: &Table,
    category_key: &str,
    product_key: &str,
    result_key: &str,
) -> Result<Vec<CategoryMetric>, AggregationError> {
    // Validate everything up front so an absent column fails before any work.
    for column in [category_key, product_key, result_key] {
        table.require(column)?;
    }
    categories(table, category_key)?
        .into_iter()
        .map(|category| -> Result<CategoryMetric, AggregationError> {
            let rate = category_rate_by(table, category_key, &category, result_key)?;
            let product_breakdown =
                product_breakdown(table, category_key, &category, product_key, result_key)?;
            Ok(CategoryMetric {
                category,
                win_rate: rate.win_rate,
                lose_rate: rate.lose_rate,
                record_count: rate.count,
                product_breakdown,
            })
        })
        .collect()
}

/// One summary per account manager, highest total NILAI first.
///
/// Rows without an AM are skipped. Equal totals keep the order in which the
/// AMs first appear in the table.
pub fn am_rollup(table: &Table) -> Result<Vec<AccountManagerSummary>, AggregationError> {
    #[derive(Default)]
    struct Acc<'a> {
        customers: HashSet<&'a str>,
        rows: usize,
        values: Vec<Option<f64>>,
        progress: Vec<Option<f64>>,
    }

    let am_idx = table.require(COL_AM)?;
    let cust_idx = table.column_index(COL_CUSTOMER);
    let value_idx = table.column_index(COL_NILAI);
    let prog_idx = table.column_index(COL_PROGRESS_PCT);

    let mut order: Vec<&str> = Vec::new();
    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in table.rows() {
        let Some(am) = r.text(am_idx) else { continue };
        let e = map.entry(am).or_insert_with(|| {
            order.push(am);
            Acc::default()
        });
        if let Some(c) = r.text_opt(cust_idx) {
            e.customers.insert(c);
        }
        e.rows += 1;
        e.values.push(r.number_opt(value_idx));
        e.progress.push(r.number_opt(prog_idx));
    }

    let mut rows: Vec<AccountManagerSummary> = order
        .into_iter()
        .filter_map(|am| map.remove(am).map(|acc| (am, acc)))
        .map(|(am, acc)| AccountManagerSummary {
            am_name: am.to_string(),
            distinct_customer_count: acc.customers.len(),
            product_count: acc.rows,
            total_value: sum_present(acc.values),
            avg_progress: mean_present(acc.progress),
        })
        .collect();
    // `sort_by` is stable, so ties stay in first-seen order.
    rows.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(Ordering::Equal)
    });
    Ok(rows)
}

/// Customers of one AM with their products, in first-seen order.
pub fn am_customers(table: &Table, am_name: &str) -> Result<Vec<CustomerDetail>, AggregationError> {
    let am_idx = table.require(COL_AM)?;
    let cust_idx = table.require(COL_CUSTOMER)?;
    let prod_idx = table.column_index(COL_PRODUCT);
    let value_idx = table.column_index(COL_NILAI);
    let prog_idx = table.column_index(COL_PROGRESS_PCT);
    let res_idx = table.column_index(COL_RESULTS_PCT);
    let status_idx = table.column_index(COL_PROGRESS_STATUS);

    let mut out: Vec<CustomerDetail> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for r in table.rows().filter(|r| r.text(am_idx) == Some(am_name)) {
        let customer = r.text(cust_idx).unwrap_or(MISSING_LABEL);
        let pos = *positions.entry(customer).or_insert_with(|| {
            out.push(CustomerDetail {
                customer_name: customer.to_string(),
                total_value: 0.0,
                products: Vec::new(),
            });
            out.len() - 1
        });
        let nilai = r.number_opt(value_idx);
        let detail = &mut out[pos];
        detail.total_value += nilai.unwrap_or(0.0);
        detail.products.push(CustomerProduct {
            product: r.text_opt(prod_idx).unwrap_or(MISSING_LABEL).to_string(),
            nilai,
            progress_pct: r.number_opt(prog_idx),
            results_pct: r.number_opt(res_idx),
            status: r.text_opt(status_idx).map(str::to_string),
        });
    }
    Ok(out)
}

/// Win/lose card plus detail rows for a single `PRODUCT HIGH FIVE` value.
///
/// Rows are ordered by `% Results` descending; ties and rows without a
/// result keep table order, the latter after every scored row. A product
/// with no rows yields `WinLose::EMPTY` and an empty listing.
pub fn product_focus(table: &Table, product: &str) -> Result<ProductFocus, AggregationError> {
    let prod_idx = table.require(COL_PRODUCT_HIGH_FIVE)?;
    let res_idx = table.require(COL_RESULTS_PCT)?;
    let cust_idx = table.column_index(COL_CUSTOMER);
    let am_idx = table.column_index(COL_AM);
    let value_idx = table.column_index(COL_NILAI);
    let prog_idx = table.column_index(COL_PROGRESS_PCT);
    let status_idx = table.column_index(COL_RESULT_STATUS);

    let matching: Vec<Row<'_>> = table
        .rows()
        .filter(|r| r.text(prod_idx) == Some(product))
        .collect();
    let rate = win_lose(matching.iter().copied(), res_idx);

    let mut rows: Vec<FocusRow> = matching
        .into_iter()
        .map(|r| FocusRow {
            customer_name: r.text_opt(cust_idx).unwrap_or(MISSING_LABEL).to_string(),
            am: r.text_opt(am_idx).unwrap_or(MISSING_LABEL).to_string(),
            nilai: r.number_opt(value_idx),
            progress_pct: r.number_opt(prog_idx),
            results_pct: r.percent(res_idx),
            result_status: r.text_opt(status_idx).map(str::to_string),
        })
        .collect();
    rows.sort_by(|a, b| match (a.results_pct, b.results_pct) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Ok(ProductFocus {
        product: product.to_string(),
        rate,
        rows,
    })
}

/// Per `PRODUCT HIGH FIVE` totals, most frequent product first.
///
/// `count` is the number of rows for the product, including rows with a
/// blank customer name.
pub fn product_summary(table: &Table) -> Result<Vec<ProductSummary>, AggregationError> {
    #[derive(Default)]
    struct Acc {
        count: usize,
        values: Vec<Option<f64>>,
        results: Vec<Option<f64>>,
        progress: Vec<Option<f64>>,
    }

    let prod_idx = table.require(COL_PRODUCT_HIGH_FIVE)?;
    let value_idx = table.column_index(COL_NILAI);
    let res_idx = table.column_index(COL_RESULTS_PCT);
    let prog_idx = table.column_index(COL_PROGRESS_PCT);

    let mut order: Vec<&str> = Vec::new();
    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in table.rows() {
        let Some(product) = r.text(prod_idx) else { continue };
        let e = map.entry(product).or_insert_with(|| {
            order.push(product);
            Acc::default()
        });
        e.count += 1;
        e.values.push(r.number_opt(value_idx));
        e.results.push(r.number_opt(res_idx));
        e.progress.push(r.number_opt(prog_idx));
    }

    let mut rows: Vec<ProductSummary> = order
        .into_iter()
        .filter_map(|p| map.remove(p).map(|acc| (p, acc)))
        .map(|(product, acc)| ProductSummary {
            product: product.to_string(),
            count: acc.count,
            total_value: sum_present(acc.values),
            avg_results: mean_present(acc.results),
            avg_progress: mean_present(acc.progress),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(rows)
}

pub fn overview(table: &Table) -> OverviewStats {
    let distinct = |column: &str| -> usize {
        table
            .column_index(column)
            .map(|idx| table.rows().filter_map(|r| r.text(idx)).collect::<HashSet<_>>().len())
            .unwrap_or(0)
    };
    let prog_idx = table.column_index(COL_PROGRESS_PCT);
    OverviewStats {
        total_records: table.len(),
        total_witel: distinct(COL_WITEL),
        total_products: distinct(COL_PRODUCT_HIGH_FIVE),
        avg_progress: mean_present(table.rows().map(|r| r.number_opt(prog_idx))),
    }
}

/// Flat AM / customer / product listing sorted by those three keys.
pub fn detail_rows(table: &Table) -> Result<Vec<DetailRow>, AggregationError> {
    let am_idx = table.require(COL_AM)?;
    let cust_idx = table.require(COL_CUSTOMER)?;
    let prod_idx = table.require(COL_PRODUCT)?;
    let value_idx = table.column_index(COL_NILAI);
    let prog_idx = table.column_index(COL_PROGRESS_PCT);
    let res_idx = table.column_index(COL_RESULTS_PCT);
    let status_idx = table.column_index(COL_PROGRESS_STATUS);

    let label = |s: Option<&str>| s.unwrap_or(MISSING_LABEL).to_string();
    let mut rows: Vec<DetailRow> = table
        .rows()
        .map(|r| DetailRow {
            am: label(r.text(am_idx)),
            customer_name: label(r.text(cust_idx)),
            product: label(r.text(prod_idx)),
            nilai: r.number_opt(value_idx),
            progress_pct: r.number_opt(prog_idx),
            results_pct: r.number_opt(res_idx),
            status: r.text_opt(status_idx).map(str::to_string),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.am
            .cmp(&b.am)
            .then_with(|| a.customer_name.cmp(&b.customer_name))
            .then_with(|| a.product.cmp(&b.product))
    });
    Ok(rows)
}
