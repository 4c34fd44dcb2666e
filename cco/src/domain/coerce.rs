//! Lenient conversions from loosely-typed model JSON
//!
//! Models write `"4,500"` for 4500, `"₹1,200/month"` for 1200 and `null`
//! for "I don't know". These helpers accept what can be read sensibly and
//! return `None` for the rest; callers decide on the fallback.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// A whole string that is one amount: optional currency marker, digits with
/// thousands separators, optional fraction, optional `INR` and `/month`
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:₹|rs\.?|inr|\$)?\s*(-?\d{1,3}(?:,\d{2,3})*(?:\.\d+)?|-?\d+(?:\.\d+)?)\s*(?:inr|rs\.?)?\s*(?:(?:/|per\s+)(?:month|mo))?$",
    )
    .expect("amount pattern is valid")
});

/// Read a number from a JSON number or a string holding exactly one amount
///
/// Shorthand such as `"10k"`, `"1.5 lakh"` or `"1e4"` is not an amount.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let caps = AMOUNT_RE.captures(s.trim())?;
            let token = caps.get(1)?.as_str().replace(',', "");
            token.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Read a non-negative whole number
///
/// JSON numbers are truncated; strings must hold a whole amount.
pub fn whole_number(value: &Value) -> Option<u64> {
    if let Value::Number(n) = value
        && let Some(u) = n.as_u64()
    {
        return Some(u);
    }
    let f = number(value)?;
    if f < 0.0 || f > u64::MAX as f64 {
        return None;
    }
    if value.is_string() && f.fract() != 0.0 {
        return None;
    }
    Some(f.trunc() as u64)
}

/// Read a string; numbers and booleans are rendered as text
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a list of strings; a lone string becomes a one-item list
pub fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).filter(|s| !s.is_empty()).collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// First key present (and not null) in `map`
pub fn first_of<'a>(map: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| map.get(*k)).find(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number() {
        assert_eq!(number(&json!(3000)), Some(3000.0));
        assert_eq!(number(&json!(12.5)), Some(12.5));
        assert_eq!(number(&json!("4,500")), Some(4500.0));
        assert_eq!(number(&json!("₹1,200/month")), Some(1200.0));
        assert_eq!(number(&json!("-40.25 INR")), Some(-40.25));
        assert_eq!(number(&json!("Rs. 2,50,000 per month")), Some(250000.0));
        assert_eq!(number(&json!("abc")), None);
        assert_eq!(number(&json!(null)), None);
        assert_eq!(number(&json!(true)), None);
    }

    #[test]
    fn test_shorthand_is_not_a_number() {
        for raw in ["10k", "1.5 lakh", "between 10 and 20 thousand", "1e4", "1.2k", "approx 4000", "4000-5000"] {
            assert_eq!(number(&json!(raw)), None, "input: {}", raw);
        }
    }

    #[test]
    fn test_whole_number() {
        assert_eq!(whole_number(&json!(5000)), Some(5000));
        assert_eq!(whole_number(&json!(4999.9)), Some(4999));
        assert_eq!(whole_number(&json!("8000")), Some(8000));
        assert_eq!(whole_number(&json!(-1)), None);
        assert_eq!(whole_number(&json!("abc")), None);
        assert_eq!(whole_number(&json!("12,000.50")), None);
        assert_eq!(whole_number(&json!("12,000.00")), Some(12000));
        assert_eq!(whole_number(&json!([5000])), None);
    }

    #[test]
    fn test_text() {
        assert_eq!(text(&json!("  EC2 ")), Some("EC2".to_string()));
        assert_eq!(text(&json!(2025)), Some("2025".to_string()));
        assert_eq!(text(&json!({"a": 1})), None);
    }

    #[test]
    fn test_text_list() {
        assert_eq!(text_list(&json!(["a", "", 3])), vec!["a", "3"]);
        assert_eq!(text_list(&json!("AWS")), vec!["AWS"]);
        assert!(text_list(&json!(null)).is_empty());
    }

    #[test]
    fn test_first_of_skips_null() {
        let map = json!({"cost": null, "cost_inr": 10}).as_object().cloned().unwrap();
        assert_eq!(first_of(&map, &["cost", "cost_inr"]), Some(&json!(10)));
        assert_eq!(first_of(&map, &["missing"]), None);
    }
}
