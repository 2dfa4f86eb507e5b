// Field coercion and small formatting/statistics helpers.
//
// Everything that turns display text from the exports into typed values
// lives here. Coercion is total: bad input becomes `None`, never an error.
use crate::types::Cell;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

// Day-first layouts come before ISO so "05/06/2025" is June 5th.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d/%m/%y"];

// chrono's `%Y` also takes "25" as year 25, which would shadow `%y`.
const MIN_YEAR: i32 = 1000;

fn try_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .find(|dt| dt.year() >= MIN_YEAR)
}

fn try_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(|d| d.year() >= MIN_YEAR)
}

/// Trimmed, non-empty text content of a cell.
pub fn cell_text(cell: &Cell) -> Option<String> {
    let s = cell.to_string();
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse Brazilian currency text such as `"R$ 11.739,00"`.
///
/// - Strips the `R$` symbol and any whitespace.
/// - Drops `.` thousands separators and turns the `,` decimal into `.`.
/// - Returns `None` for anything left that is not a finite number.
pub fn parse_currency_str(s: &str) -> Option<f64> {
    let cleaned = s
        .replace("R$", "")
        .replace('.', "")
        .replace(',', ".")
        .replace(char::is_whitespace, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Currency coercion for a raw cell; workbook numbers are already numeric.
pub fn parse_currency(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty | Cell::DateTime(_) => None,
        Cell::Number(n) => Some(*n).filter(|v| v.is_finite()),
        Cell::Text(s) => parse_currency_str(s),
    }
}

pub fn parse_datetime_dayfirst_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    try_datetime(s).or_else(|| try_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Date-only parse with the day-first convention. `"31/02/2025"` is `None`.
pub fn parse_date_dayfirst(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // A timestamp in a date column still counts as that calendar day.
    try_date(s).or_else(|| try_datetime(s).map(|dt| dt.date()))
}

pub fn parse_datetime_dayfirst(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::Empty | Cell::Number(_) => None,
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_datetime_dayfirst_str(s),
    }
}

pub fn parse_cell_date(cell: &Cell) -> Option<NaiveDate> {
    parse_datetime_dayfirst(cell).map(|dt| dt.date())
}

/// The one place a missing amount is read as zero: summing for display.
pub fn fill_zero(v: Option<f64>) -> f64 {
    v.unwrap_or(0.0)
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn median(mut v: Vec<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `,` thousands separators (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = group_digits(int_part, Locale::en.separator());
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

// Works on the digit string so magnitudes past any integer type still format.
fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Money as the dashboard metric shows it: `R$ 11,739.00`.
pub fn format_brl(n: f64) -> String {
    format!("R$ {}", format_number(n, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
