//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the console.

use uuid::Uuid;

/// Prefix of client-generated row ids that have not been saved yet
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Generate a new client-side temporary id
pub fn generate_temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())
}

/// Check whether an id was generated client-side and is not persisted
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Coerce user input into a number the way a form numeric field does
///
/// Surrounding whitespace is ignored, `0x`/`0o`/`0b` prefixes are accepted,
/// and anything that does not parse to a finite value becomes `0`.
pub fn coerce_number(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };

    let parsed = match radix {
        Some(radix) => parse_radix_digits(&trimmed[2..], radix),
        None if is_plain_decimal(trimmed) => trimmed.parse::<f64>().ok(),
        None => None,
    };

    match parsed {
        Some(value) if value.is_finite() && value != 0.0 => value,
        _ => 0.0,
    }
}

/// Unsigned digits after a `0x`/`0o`/`0b` prefix
///
/// Signs are not allowed after the prefix. Values wider than `u128` are
/// accumulated in floating point and stay finite up to `f64::MAX`.
fn parse_radix_digits(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    match u128::from_str_radix(digits, radix) {
        Ok(value) => Some(value as f64),
        Err(_) => Some(
            digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0.0, |acc, digit| acc * f64::from(radix) + f64::from(digit)),
        ),
    }
}

/// Decimal literal check that rejects `inf`, `nan` and similar words
fn is_plain_decimal(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    !body.is_empty()
        && body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

/// Format a number the way it is shown in an edit buffer
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Extract the file name from an upload URL or path
pub fn file_name(path: &str) -> String {
    let without_query = path.split(['?', '#']).next().unwrap_or(path);
    let name = without_query.rsplit('/').next().unwrap_or(without_query);
    urlencoding::decode(name)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| name.to_string())
}

/// Human readable label of a user role
pub fn role_label(role: &str) -> &'static str {
    match role {
        "ADMIN" => "Administrator",
        "MODERATOR" => "Moderator",
        "OBSERVER" => "Kuzatuvchi",
        "OPERATOR" => "Operator",
        _ => "",
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Create a pagination info string
pub fn create_pagination_info(current_page: u32, total_pages: u32, total_items: u64) -> String {
    if total_pages <= 1 {
        format!("Total: {}", total_items)
    } else {
        format!("Page {} of {} (Total: {})", current_page, total_pages, total_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_ids() {
        let id = generate_temp_id();
        assert!(is_temp_id(&id));
        assert!(!is_temp_id("42"));
        assert_ne!(generate_temp_id(), id);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("42"), 42.0);
        assert_eq!(coerce_number("  2.5 "), 2.5);
        assert_eq!(coerce_number("-7"), -7.0);
        assert_eq!(coerce_number("1e3"), 1000.0);
        assert_eq!(coerce_number("0x10"), 16.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("12abc"), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
        assert_eq!(coerce_number("1e999"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
    }

    #[test]
    fn test_coerce_number_radix_prefixes() {
        assert_eq!(coerce_number("0x+10"), 0.0);
        assert_eq!(coerce_number("0b+1"), 0.0);
        assert_eq!(coerce_number("0x-1"), 0.0);
        assert_eq!(coerce_number("0x"), 0.0);
        assert_eq!(coerce_number("0b102"), 0.0);
        assert_eq!(coerce_number("0o17"), 15.0);
        assert_eq!(coerce_number("0XfF"), 255.0);
        assert_eq!(coerce_number("0x1FFFFFFFFFFFFFFFF"), 36893488147419103232.0);

        let wide = format!("0x{}", "F".repeat(40));
        assert!(coerce_number(&wide) > 1e48);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("https://api.example.uz/media/uploads/report%202024.xlsx"), "report 2024.xlsx");
        assert_eq!(file_name("media/a.pdf?token=1"), "a.pdf");
        assert_eq!(file_name("plain.doc"), "plain.doc");
    }

    #[test]
    fn test_role_label() {
        assert_eq!(role_label("ADMIN"), "Administrator");
        assert_eq!(role_label("GUEST"), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 8), "hello...");
    }
}
