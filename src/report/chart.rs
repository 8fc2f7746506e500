//! Text primitives for the report charts.

const FULL: char = '█';
const PARTIAL: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

/// A horizontal bar for `value` scaled so that `max` spans `width` cells.
/// Non-positive values and a non-positive `max` draw nothing.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if !(value > 0.0 && max > 0.0) || width == 0 {
        return String::new();
    }
    let eighths = ((value / max).min(1.0) * width as f64 * 8.0).round() as usize;
    let mut s: String = std::iter::repeat(FULL).take(eighths / 8).collect();
    if eighths % 8 > 0 {
        s.push(PARTIAL[eighths % 8]);
    }
    s
}

/// `1234567.8` → `1,234,568` (rounded, comma-grouped).
pub fn fmt_thousands(v: f64) -> String {
    if !v.is_finite() {
        return "NaN".into();
    }
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

pub fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_thousands).unwrap_or_else(|| "NaN".into())
}

/// Widest label, for left-aligning bar rows.
pub fn label_width<'a>(labels: impl IntoIterator<Item = &'a str>) -> usize {
    labels.into_iter().map(|l| l.chars().count()).max().unwrap_or(0)
}
