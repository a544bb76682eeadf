// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" cell/number/month handling so the
// rest of the code can assume clean, typed values.
use crate::types::CellValue;
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Strictly parse a cell into a finite `f64`.
///
/// - Numeric cells pass through unless they are NaN or infinite.
/// - Text is trimmed and must parse as a whole; no thousands separators,
///   currency symbols or trailing units are tolerated.
/// - Blank cells are `None`.
pub fn parse_number(cell: Option<&CellValue>) -> Option<f64> {
    let v = match cell? {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        CellValue::Empty => return None,
    };
    v.is_finite().then_some(v)
}

/// Round half away from zero to two decimals.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Calendar sort key for a `YYYY-MM` month.
///
/// Months that do not parse sort after every real month, by their text.
pub fn month_sort_key(month: &str) -> (NaiveDate, String) {
    let date = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .unwrap_or(NaiveDate::MAX);
    (date, month.to_string())
}

/// Premium-weighted loss ratio accumulator.
///
/// Only observations with a loss ratio and a positive premium count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedRatio {
    weighted: f64,
    base: f64,
}

impl WeightedRatio {
    pub fn add(&mut self, loss_ratio: Option<f64>, premium: f64) {
        if let Some(lr) = loss_ratio {
            if premium > 0.0 {
                self.weighted += lr * premium;
                self.base += premium;
            }
        }
    }

    /// Weighted mean to two decimals, `None` when nothing counted.
    pub fn value(&self) -> Option<f64> {
        (self.base > 0.0).then(|| round2(self.weighted / self.base))
    }
}

pub fn average(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// `55.50%` (always two decimals), or the placeholder for a missing ratio.
pub fn format_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{}%", format_number(v, 2)),
        None => "—".to_string(),
    }
}
