// Utility helpers for cell coercion, skip-missing statistics and display
// formatting.
//
// This module centralizes all the "dirty" sheet/number handling so the
// rest of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` the way a spreadsheet export needs.
///
/// - Accepts `Option<&str>` so callers can pass through optional cells.
/// - Trims whitespace.
/// - Returns `None` for empty, unparsable or non-finite values (`"NaN"`,
///   `"inf"`), so they behave as missing downstream.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a percentage cell such as `"80%"`, `" 62.5 % "` or `"40"`.
///
/// Every `%` is removed before trimming and coercion; the value stays on
/// the 0..100 scale and is not clamped.
pub fn parse_percent_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.replace('%', "");
    parse_f64_safe(Some(&s))
}

/// Arithmetic mean that skips missing values. `None` when nothing is left.
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Sum that treats missing values as zero.
pub fn sum_present<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Indonesian rupiah display: `Rp 1.500.000`. Missing and zero render as
/// `Rp 0`.
pub fn format_rupiah(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format!("Rp {}", format_number(v, 0).replace(',', ".")),
        _ => "Rp 0".to_string(),
    }
}

/// Percentage display with one decimal, `-` for missing.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "-".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `1,204 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some(" 1500000 ")), Some(1_500_000.0));
        assert_eq!(parse_f64_safe(Some("12.5")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_parse_percent_safe() {
        assert_eq!(parse_percent_safe(Some("80%")), Some(80.0));
        assert_eq!(parse_percent_safe(Some(" 62.5 % ")), Some(62.5));
        assert_eq!(parse_percent_safe(Some("40")), Some(40.0));
        assert_eq!(parse_percent_safe(Some("120%")), Some(120.0));
        assert_eq!(parse_percent_safe(Some("%")), None);
        assert_eq!(parse_percent_safe(Some("n/a")), None);
    }

    #[test]
    fn test_mean_and_sum_skip_missing() {
        let v = [Some(10.0), None, Some(30.0)];
        assert_eq!(mean_present(v), Some(20.0));
        assert_eq!(sum_present(v), 40.0);
        assert_eq!(mean_present([None, None]), None);
        assert_eq!(sum_present(Vec::<Option<f64>>::new()), 0.0);
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(format_rupiah(Some(1_500_000.0)), "Rp 1.500.000");
        assert_eq!(format_rupiah(None), "Rp 0");
        assert_eq!(format_percent(Some(70.0)), "70.0%");
        assert_eq!(format_percent(None), "-");
        assert_eq!(format_number(-1234.5, 2), "-1,234.50");
        assert_eq!(format_int(9855), "9,855");
    }
}
