//! Turning user input into values of the type a field already holds

use serde_json::Value;
use shapeform_schema::number_to_json;

/// Strip an amount typed by a person down to something parseable.
///
/// Digits are kept, as is a leading minus and the first period. Grouping
/// characters, currency symbols and any later periods are dropped.
pub fn to_amount_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut seen_period = false;
    for c in input.trim().chars() {
        match c {
            '0'..='9' => out.push(c),
            '.' if !seen_period => {
                seen_period = true;
                out.push(c);
            }
            '-' if out.is_empty() => out.push(c),
            _ => {}
        }
    }
    out
}

/// Parse an amount string into a JSON number
pub fn parse_amount(input: &str) -> Option<Value> {
    let amount = to_amount_string(input);
    let parsed = amount.parse::<f64>().ok()?;
    parsed.is_finite().then(|| number_to_json(parsed))
}

/// Coerce `incoming` to the JSON type of `existing`.
///
/// Returns `None` when the value cannot be represented in that type; the
/// caller should then leave the field unchanged. An empty string for a
/// number field clears it to `null`.
pub fn coerce_to_existing_type(existing: Option<&Value>, incoming: Value) -> Option<Value> {
    match (existing, incoming) {
        (Some(Value::Number(_)), Value::String(s)) => {
            if s.trim().is_empty() {
                Some(Value::Null)
            } else {
                parse_amount(&s)
            }
        }
        (Some(Value::Number(_)), Value::Bool(b)) => Some(Value::from(u8::from(b))),
        (Some(Value::Bool(_)), Value::String(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
                "false" | "0" | "no" | "off" | "" => Some(Value::Bool(false)),
                _ => None,
            }
        }
        (Some(Value::Bool(_)), Value::Number(n)) => Some(Value::Bool(n.as_f64() != Some(0.0))),
        (Some(Value::String(_)), Value::Number(n)) => Some(Value::String(n.to_string())),
        (Some(Value::String(_)), Value::Bool(b)) => Some(Value::String(b.to_string())),
        (_, incoming) => Some(incoming),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_string() {
        assert_eq!(to_amount_string("1,234.56.78"), "1234.5678");
        assert_eq!(to_amount_string(""), "");
        assert_eq!(to_amount_string(" $ -1 200 "), "-1200");
        assert_eq!(to_amount_string("12-3"), "123");
        assert_eq!(to_amount_string("abc"), "");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,200"), Some(json!(1200)));
        assert_eq!(parse_amount("3.5 €"), Some(json!(3.5)));
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("."), None);
    }

    #[test]
    fn test_coerce_to_number() {
        let existing = json!(10);
        assert_eq!(coerce_to_existing_type(Some(&existing), json!("1,234.5")), Some(json!(1234.5)));
        assert_eq!(coerce_to_existing_type(Some(&existing), json!("")), Some(Value::Null));
        assert_eq!(coerce_to_existing_type(Some(&existing), json!("n/a")), None);
        assert_eq!(coerce_to_existing_type(Some(&existing), json!(true)), Some(json!(1)));
    }

    #[test]
    fn test_coerce_to_boolean() {
        let existing = json!(false);
        assert_eq!(coerce_to_existing_type(Some(&existing), json!("Yes")), Some(json!(true)));
        assert_eq!(coerce_to_existing_type(Some(&existing), json!("off")), Some(json!(false)));
        assert_eq!(coerce_to_existing_type(Some(&existing), json!("maybe")), None);
        assert_eq!(coerce_to_existing_type(Some(&existing), json!(0)), Some(json!(false)));
    }

    #[test]
    fn test_coerce_to_string() {
        let existing = json!("x");
        assert_eq!(coerce_to_existing_type(Some(&existing), json!(12)), Some(json!("12")));
        assert_eq!(coerce_to_existing_type(Some(&existing), json!(true)), Some(json!("true")));
    }

    #[test]
    fn test_without_existing_value_passes_through() {
        assert_eq!(coerce_to_existing_type(None, json!("12")), Some(json!("12")));
        assert_eq!(coerce_to_existing_type(Some(&Value::Null), json!({"a": 1})), Some(json!({"a": 1})));
    }
}
