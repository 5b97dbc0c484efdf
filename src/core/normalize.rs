//! Purpose: Canonicalize raw keys/values and coerce values for numeric and dedup queries.
//! Exports: `normalize_key`, `normalize_value`, `normalize_column`, `dedup_marker`, `try_parse_number`.
//! Role: Leaf layer applied to every entry at table construction and to every column lookup.
//! Invariants: All functions are pure and total; unsupported inputs pass through or yield `None`.
//! Invariants: Numeric coercion follows one fixed grammar, never the platform's float parser alone.
use crate::core::value::{Key, Value};

/// Trims and lower-cases text keys; positional keys pass through.
pub fn normalize_key(key: Key) -> Key {
    match key {
        Key::Text(text) => Key::Text(text.trim().to_lowercase()),
        other => other,
    }
}

/// Trims text values; every other variant passes through.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Text(text) => {
            let trimmed = text.trim();
            if trimmed.len() == text.len() {
                Value::Text(text)
            } else {
                Value::Text(trimmed.to_string())
            }
        }
        other => other,
    }
}

/// Normalized lookup key for a column name given by a caller.
pub fn normalize_column(column: &str) -> Key {
    Key::Text(column.trim().to_lowercase())
}

/// Marker deciding whether two values count as the same distinct value.
pub fn dedup_marker(value: &Value) -> String {
    value.to_string().trim().to_lowercase()
}

/// Numeric reading of a value, or `None` when it is not a number.
///
/// `Int` and `Float` are numbers as-is. Text is accepted when, after trimming
/// surrounding whitespace, it matches
/// `[+-]? (digits ("." digits?)? | "." digits) ([eE] [+-]? digits)?`.
/// Nulls, booleans and every other text are rejected.
pub fn try_parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        Value::Text(text) => parse_number_text(text),
        Value::Null | Value::Bool(_) => None,
    }
}

fn parse_number_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if !is_number_literal(text.as_bytes()) {
        return None;
    }
    text.parse::<f64>().ok()
}

fn is_number_literal(bytes: &[u8]) -> bool {
    let mut pos = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        frac_digits = count_digits(&bytes[pos..]);
        pos += frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exp_digits = count_digits(&bytes[pos..]);
        if exp_digits == 0 {
            return false;
        }
        pos += exp_digits;
    }

    pos == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::{dedup_marker, normalize_column, normalize_key, normalize_value, try_parse_number};
    use crate::core::value::{Key, Value};

    #[test]
    fn text_keys_are_trimmed_and_lowercased() {
        assert_eq!(normalize_key(Key::from("  Name ")), Key::from("name"));
        assert_eq!(normalize_key(Key::from("TEMPERATURE")), Key::from("temperature"));
        assert_eq!(normalize_column(" Country\t"), Key::from("country"));
    }

    #[test]
    fn positional_keys_pass_through() {
        assert_eq!(normalize_key(Key::Index(3)), Key::Index(3));
    }

    #[test]
    fn text_values_are_trimmed_but_keep_case() {
        assert_eq!(normalize_value(Value::from(" X ")), Value::from("X"));
        assert_eq!(normalize_value(Value::from("Berlin")), Value::from("Berlin"));
        assert_eq!(normalize_value(Value::Int(4)), Value::Int(4));
        assert_eq!(normalize_value(Value::Null), Value::Null);
    }

    #[test]
    fn dedup_marker_folds_case_and_space() {
        assert_eq!(dedup_marker(&Value::from(" spain ")), "spain");
        assert_eq!(dedup_marker(&Value::from("Spain")), "spain");
        assert_eq!(dedup_marker(&Value::Int(1)), dedup_marker(&Value::from("1")));
        assert_eq!(dedup_marker(&Value::Bool(true)), "true");
    }

    #[test]
    fn numbers_parse_from_clean_text() {
        let cases = [
            ("10", 10.0),
            ("-3", -3.0),
            ("+2.5", 2.5),
            (" 12.75 ", 12.75),
            ("1e3", 1000.0),
            ("2.5E-1", 0.25),
            (".5", 0.5),
            ("5.", 5.0),
        ];
        for (text, expected) in cases {
            assert_eq!(try_parse_number(&Value::from(text)), Some(expected), "{text}");
        }
    }

    #[test]
    fn non_numbers_are_rejected() {
        let cases = [
            "", " ", "abc", "1,5", "12C", "e3", "1e", "+", ".", "--1", "inf", "NaN", "1 2",
        ];
        for text in cases {
            assert_eq!(try_parse_number(&Value::from(text)), None, "{text:?}");
        }
        assert_eq!(try_parse_number(&Value::Null), None);
        assert_eq!(try_parse_number(&Value::Bool(true)), None);
    }

    #[test]
    fn native_numbers_are_accepted() {
        assert_eq!(try_parse_number(&Value::Int(7)), Some(7.0));
        assert_eq!(try_parse_number(&Value::Float(-0.5)), Some(-0.5));
    }
}
