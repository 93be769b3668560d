//! Display formatting shared by the CLI tables and the PDF report.

/// Group the integer part with `.` as thousands separator: `1234567.4` -> `1.234.567`.
pub fn grouped(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Rupiah amount, e.g. `Rp 4.500.000`.
pub fn currency(value: f64) -> String {
    format!("Rp {}", grouped(value))
}

pub fn percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}%")
    } else {
        "0.00%".to_string()
    }
}
