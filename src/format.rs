// Number formatting for KPIs and the detail table.
// Thousands separators come from num-format; decimals from std formatting.

use num_format::{Locale, ToFormattedString};

/// Fixed decimals with `,` thousands separators, e.g. `1,234,567.89`.
/// NaN and infinities are printed as-is.
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return format!("{}", n);
    }
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let grouped = match int_part.parse::<u64>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        // beyond u64; leave ungrouped
        Err(_) => int_part.to_string(),
    };

    let mut res = String::new();
    if n.is_sign_negative() && s.chars().any(|c| c != '0' && c != '.') {
        res.push('-');
    }
    res.push_str(&grouped);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    res
}

/// `{:.2}%` style, without grouping
pub fn format_percent(n: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, n)
}
