use crate::columns::CellValue;

/// Placeholder printed for absent values.
pub const MISSING: &str = "-";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut result = group_thousands(int_part);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }

    // "-0.00" reads badly; only print the sign when something non-zero survives.
    let is_zero = result.chars().all(|c| matches!(c, '0' | '.' | ','));
    if value < 0.0 && !is_zero {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a nightly price with two decimals and thousands separators.
///
/// ```
/// use dashboard_core::formatting::format_price;
///
/// assert_eq!(format_price(1234.5), "1,234.50");
/// ```
pub fn format_price(price: f64) -> String {
    format_number(price, 2)
}

/// Format an optional value, printing [`MISSING`] when absent.
///
/// ```
/// use dashboard_core::formatting::format_optional;
///
/// assert_eq!(format_optional(Some(4.876), 2), "4.88");
/// assert_eq!(format_optional(None, 2), "-");
/// ```
pub fn format_optional(value: Option<f64>, decimals: u32) -> String {
    match value {
        Some(v) => format_number(v, decimals),
        None => MISSING.to_string(),
    }
}

/// Render a projected table cell as plain text.
pub fn format_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(v) => format_number(*v, 2),
        CellValue::Count(n) => format_number(f64::from(*n), 0),
        CellValue::Month(m) => m.to_string(),
        CellValue::Missing => MISSING.to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
