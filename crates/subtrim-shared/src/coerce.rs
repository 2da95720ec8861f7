//! Field coercion rules for model-derived values.
//!
//! Every value coming back from the completion collaborator passes through
//! exactly one of these before it reaches a client-facing field. All of them
//! are total: they never panic and always yield the target type or a
//! well-defined null.

use serde_json::Value;

/// Confidence used when the model supplied none (or garbage).
pub const DEFAULT_CONFIDENCE: f64 = 0.2;

/// Numbers pass through when finite; strings are stripped to digits and
/// dots, then parsed. Everything else is null.
pub fn to_nullable_number(v: Option<&Value>) -> Option<f64> {
    match v {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()),
        Some(Value::String(s)) => {
            let cleaned: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Strings pass through verbatim; any other type is null.
pub fn to_nullable_string(v: Option<&Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Trimmed variant for fields that require whitespace normalization.
/// Whitespace-only strings are treated as absent.
pub fn to_trimmed_string(v: Option<&Value>) -> Option<String> {
    to_nullable_string(v)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Three-valued logic: only an exact boolean passes, anything else is
/// unknown.
pub fn to_nullable_boolean(v: Option<&Value>) -> Option<bool> {
    match v {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    }
}

/// Loose truthiness for flags the model may return as 0/1, "yes", etc.
pub fn truthy(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

/// Coerce to a number and clamp into [0.0, 1.0]; absent or non-finite values
/// fall back to `DEFAULT_CONFIDENCE`.
pub fn clamp_confidence(v: Option<&Value>) -> f64 {
    match to_nullable_number(v) {
        Some(n) => n.clamp(0.0, 1.0),
        None => DEFAULT_CONFIDENCE,
    }
}

/// Normalize a caller-supplied country code: default "US", trimmed,
/// uppercased, exactly two characters.
pub fn normalize_country_code(v: Option<&str>) -> String {
    let trimmed = v.unwrap_or("").trim();
    if trimmed.is_empty() {
        return "US".to_string();
    }
    trimmed.to_uppercase().chars().take(2).collect()
}

/// A non-empty trimmed lowercase string passes through verbatim. No
/// vocabulary check happens here; the prompt requests the enumerated values
/// but this layer stays lenient.
pub fn normalize_billing_period(v: Option<&Value>) -> Option<String> {
    to_nullable_string(v)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Non-strings become empty; strings longer than `max_len` are truncated
/// with a marker appended.
pub fn safe_truncate(v: Option<&Value>, max_len: usize) -> String {
    let s = match v {
        Some(Value::String(s)) => s.as_str(),
        _ => "",
    };
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_len).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_coercion_strips_currency_noise() {
        assert_eq!(to_nullable_number(Some(&json!("$9.99/mo"))), Some(9.99));
    }

    #[test]
    fn number_coercion_rejects_words() {
        assert_eq!(to_nullable_number(Some(&json!("free"))), None);
    }

    #[test]
    fn number_coercion_passes_finite_numbers() {
        assert_eq!(to_nullable_number(Some(&json!(12.5))), Some(12.5));
        assert_eq!(to_nullable_number(Some(&json!(0))), Some(0.0));
    }

    #[test]
    fn number_coercion_rejects_non_numbers() {
        assert_eq!(to_nullable_number(Some(&json!(true))), None);
        assert_eq!(to_nullable_number(Some(&json!(null))), None);
        assert_eq!(to_nullable_number(None), None);
    }

    #[test]
    fn string_coercion_is_strict_about_type() {
        assert_eq!(to_nullable_string(Some(&json!(42))), None);
        assert_eq!(to_nullable_string(Some(&json!("x"))), Some("x".to_string()));
    }

    #[test]
    fn trimmed_string_drops_whitespace_only() {
        assert_eq!(to_trimmed_string(Some(&json!("  a@b.c "))), Some("a@b.c".to_string()));
        assert_eq!(to_trimmed_string(Some(&json!("   "))), None);
    }

    #[test]
    fn boolean_coercion_is_three_valued() {
        assert_eq!(to_nullable_boolean(Some(&json!(true))), Some(true));
        assert_eq!(to_nullable_boolean(Some(&json!("true"))), None);
        assert_eq!(to_nullable_boolean(Some(&json!(1))), None);
    }

    #[test]
    fn truthy_follows_loose_rules() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!(1))));
        assert!(truthy(Some(&json!("yes"))));
        assert!(!truthy(Some(&json!(false))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(Some(&json!(null))));
        assert!(!truthy(None));
    }

    #[test]
    fn confidence_clamps_and_defaults() {
        assert_eq!(clamp_confidence(Some(&json!(1.7))), 1.0);
        assert_eq!(clamp_confidence(Some(&json!(-0.2))), 0.0);
        assert_eq!(clamp_confidence(Some(&json!(0.6))), 0.6);
        assert_eq!(clamp_confidence(None), DEFAULT_CONFIDENCE);
        assert_eq!(clamp_confidence(Some(&json!("garbage"))), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn country_code_normalizes() {
        assert_eq!(normalize_country_code(Some("ca")), "CA");
        assert_eq!(normalize_country_code(Some(" gbr ")), "GB");
        assert_eq!(normalize_country_code(Some("")), "US");
        assert_eq!(normalize_country_code(None), "US");
    }

    #[test]
    fn billing_period_is_lenient() {
        assert_eq!(
            normalize_billing_period(Some(&json!(" Monthly "))),
            Some("monthly".to_string())
        );
        // Out-of-vocabulary values pass through untouched.
        assert_eq!(
            normalize_billing_period(Some(&json!("fortnightly"))),
            Some("fortnightly".to_string())
        );
        assert_eq!(normalize_billing_period(Some(&json!(12))), None);
        assert_eq!(normalize_billing_period(Some(&json!(""))), None);
    }

    #[test]
    fn safe_truncate_bounds_and_marks() {
        assert_eq!(safe_truncate(Some(&json!("short")), 10), "short");
        assert_eq!(safe_truncate(Some(&json!("abcdef")), 3), "abc…");
        assert_eq!(safe_truncate(Some(&json!(99)), 10), "");
        assert_eq!(safe_truncate(None, 10), "");
    }
}
