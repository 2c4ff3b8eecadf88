// Numeric coercion for loosely typed CSV and store values.
//
// Malformed input never aborts a row: counters fall back to zero and ids fall
// back to "unknown".

use serde_json::Value;
use tracing::debug;

use crate::cell::Field;

fn clean(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// Coerce to an integer counter. Empty or malformed input becomes 0; values
/// with a decimal point are truncated toward zero.
pub fn to_int(raw: &str) -> i64 {
    let s = clean(raw);
    if s.is_empty() {
        return 0;
    }
    if s.contains('.') || s.contains('e') || s.contains('E') {
        return match s.parse::<f64>() {
            Ok(f) if f.is_finite() => f.trunc() as i64,
            _ => {
                debug!("coercing non-numeric value {raw:?} to 0");
                0
            }
        };
    }
    s.parse::<i64>().unwrap_or_else(|_| {
        debug!("coercing non-numeric value {raw:?} to 0");
        0
    })
}

/// Coerce to a float. Empty, malformed, or non-finite input becomes 0.0.
pub fn to_float(raw: &str) -> f64 {
    let s = clean(raw);
    if s.is_empty() {
        return 0.0;
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => f,
        _ => {
            debug!("coercing non-numeric value {raw:?} to 0.0");
            0.0
        }
    }
}

/// Normalize an identifier written as `"5"`, `"005"`, `"5.0"`, or a quoted
/// JSON number. Returns `None` for anything that is not a whole number.
pub fn normalize_id(raw: &str) -> Option<i64> {
    let s = clean(raw);
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let float = match serde_json::from_str::<Value>(s) {
        Ok(Value::Number(n)) => n.as_f64(),
        _ => s.parse::<f64>().ok(),
    }?;
    if float.is_finite() && float.fract() == 0.0 {
        Some(float as i64)
    } else {
        None
    }
}

/// True for the "nothing here" spellings a stats column uses: empty, `0`,
/// `0.0`.
pub fn is_zero_placeholder(raw: &str) -> bool {
    let s = clean(raw);
    s.is_empty() || s.parse::<f64>().is_ok_and(|f| f == 0.0)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Integer value of a cell; null and absent are 0.
pub fn field_int(field: Option<&Field>) -> i64 {
    field.and_then(Field::as_text).map(to_int).unwrap_or(0)
}

/// Normalized id of a cell, if it holds one.
pub fn field_id(field: Option<&Field>) -> Option<i64> {
    field.and_then(Field::as_text).and_then(normalize_id)
}

// ---------------------------------------------------------------------------
// JSON-encoded columns
// ---------------------------------------------------------------------------

/// Decode a JSON array of strings (e.g. `["pitcher","catcher"]`). A bare
/// non-JSON string is treated as a single entry.
pub fn decode_list(raw: &str) -> Vec<String> {
    let s = raw.trim();
    if s.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Ok(Value::String(single)) => vec![single],
        _ => vec![s.to_string()],
    }
}

/// Decode a JSON object of string values (lineup/positions maps). Entries
/// with null values are kept as empty strings so the slot survives.
pub fn decode_map(raw: &str) -> Option<Vec<(String, String)>> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => Some(
            map.into_iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (k, v)
                })
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------
    // to_int / to_float
    // ------------------------------------------------------------------

    #[test]
    fn to_int_handles_common_spellings() {
        assert_eq!(to_int("12"), 12);
        assert_eq!(to_int(" 7 "), 7);
        assert_eq!(to_int("\"3\""), 3);
        assert_eq!(to_int("4.9"), 4);
        assert_eq!(to_int("-2"), -2);
    }

    #[test]
    fn to_int_falls_back_to_zero() {
        assert_eq!(to_int(""), 0);
        assert_eq!(to_int("n/a"), 0);
        assert_eq!(to_int("1.2.3"), 0);
    }

    #[test]
    fn to_float_rejects_non_finite() {
        assert_eq!(to_float("inf"), 0.0);
        assert_eq!(to_float("NaN"), 0.0);
        assert!((to_float("6.1") - 6.1).abs() < 1e-9);
    }

    // ------------------------------------------------------------------
    // normalize_id
    // ------------------------------------------------------------------

    #[test]
    fn normalize_id_tolerates_float_and_padded_forms() {
        assert_eq!(normalize_id("5"), Some(5));
        assert_eq!(normalize_id("005"), Some(5));
        assert_eq!(normalize_id("5.0"), Some(5));
        assert_eq!(normalize_id("'42'"), Some(42));
        assert_eq!(normalize_id("1e2"), Some(100));
    }

    #[test]
    fn normalize_id_rejects_fractions_and_names() {
        assert_eq!(normalize_id("5.5"), None);
        assert_eq!(normalize_id("Hawks"), None);
        assert_eq!(normalize_id(""), None);
    }

    #[test]
    fn zero_placeholders() {
        assert!(is_zero_placeholder("0"));
        assert!(is_zero_placeholder("0.0"));
        assert!(is_zero_placeholder(""));
        assert!(!is_zero_placeholder("3"));
        assert!(!is_zero_placeholder("Hawks"));
    }

    // ------------------------------------------------------------------
    // Fields and JSON columns
    // ------------------------------------------------------------------

    #[test]
    fn null_and_absent_fields_are_zero() {
        assert_eq!(field_int(None), 0);
        assert_eq!(field_int(Some(&Field::Null)), 0);
        assert_eq!(field_int(Some(&Field::value("9"))), 9);
        assert_eq!(field_id(Some(&Field::value("5.0"))), Some(5));
    }

    #[test]
    fn decode_list_accepts_json_and_bare_strings() {
        assert_eq!(decode_list(r#"["pitcher","catcher"]"#), vec!["pitcher", "catcher"]);
        assert_eq!(decode_list("shortstop"), vec!["shortstop"]);
        assert!(decode_list("").is_empty());
    }

    #[test]
    fn decode_map_keeps_null_slots() {
        let map = decode_map(r#"{"1": "Ann", "2": null}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains(&("2".to_string(), String::new())));
        assert!(decode_map("not json").is_none());
    }
}
