/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Cleaned field, or `None` for blanks and the API's `..` "not available" marker.
pub fn non_missing(raw: &str) -> Option<&str> {
    match clean_str(raw) {
        "" | ".." | "." => None,
        s => Some(s),
    }
}

/// Parse a numeric cell. Accepts a decimal comma; non-finite values count as missing.
pub fn parse_value(raw: &str) -> Option<f64> {
    let s = non_missing(raw)?;
    s.parse::<f64>()
        .ok()
        .or_else(|| s.replace(',', ".").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_quotes_and_missing_markers() {
        assert_eq!(clean_str(r#"  "DANSK" "#), "DANSK");
        assert_eq!(non_missing(".."), None);
        assert_eq!(non_missing("  "), None);
        assert_eq!(non_missing("IND_VEST"), Some("IND_VEST"));
    }

    #[test]
    fn parses_values() {
        assert_eq!(parse_value("323456"), Some(323456.0));
        assert_eq!(parse_value("12,5"), Some(12.5));
        assert_eq!(parse_value(".."), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("abc"), None);
    }
}
