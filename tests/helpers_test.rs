//! Property tests for numeric cell coercion

use bulletin_console::utils::helpers::{coerce_number, format_number};
use proptest::prelude::*;

proptest! {
    #[test]
    fn finite_numbers_survive_display(value in prop::num::f64::NORMAL | prop::num::f64::ZERO) {
        prop_assert_eq!(coerce_number(&value.to_string()), value);
    }

    #[test]
    fn words_become_zero(word in "[a-zA-Z]{1,12}") {
        prop_assert_eq!(coerce_number(&word), 0.0);
    }

    #[test]
    fn surrounding_whitespace_is_ignored(input in "[0-9a-fx.+-]{0,10}", pad in "[ \t\n]{0,4}") {
        let padded = format!("{}{}{}", pad, input, pad);
        prop_assert_eq!(coerce_number(&padded), coerce_number(&input));
    }

    #[test]
    fn integers_format_without_fraction(value in -1_000_000i64..1_000_000) {
        prop_assert_eq!(format_number(value as f64), value.to_string());
    }
}

#[test]
fn test_prefixed_and_invalid_input() {
    assert_eq!(coerce_number("0x10"), 16.0);
    assert_eq!(coerce_number("0b101"), 5.0);
    assert_eq!(coerce_number("  12.5 "), 12.5);
    assert_eq!(coerce_number("inf"), 0.0);
    assert_eq!(coerce_number("1e400"), 0.0);
    assert_eq!(coerce_number("abc"), 0.0);
}
