//! Coercion of loosely typed field values into the typed forms the query
//! engine and wire contract need.
//!
//! The source data comes from a spreadsheet, so the same column can hold
//! numbers, numeric-looking strings, empty cells and free text. Each
//! function here documents exactly which of those it accepts.

use super::value::Value;

/// Currency symbol stripped before attribute equality comparisons
pub const CURRENCY_SYMBOL: char = '$';

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("value '{value}' is not a number")]
    NotNumeric { value: String },

    #[error("value '{value}' is not an integer")]
    NotIntegral { value: String },

    #[error("field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: Box<ConversionError>,
    },

    #[error("percentile {0} is outside 0..=100")]
    PercentileOutOfRange(f64),
}

impl ConversionError {
    /// Attach the name of the field whose value failed to convert
    pub fn in_field(self, field: &str) -> Self {
        ConversionError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }
}

/// Parse text as a float, tolerating surrounding whitespace
pub fn parse_f64(text: &str) -> Result<f64, ConversionError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ConversionError::NotNumeric {
            value: text.to_string(),
        })
}

/// Convert a field value to a float.
///
/// Numbers convert directly, booleans count as 1 and 0, strings must
/// parse as a float. Empty cells and free text are rejected.
pub fn to_f64(value: &Value) -> Result<f64, ConversionError> {
    match value {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Int64(i) => Ok(*i as f64),
        Value::Float64(f) => Ok(*f),
        Value::String(s) => parse_f64(s),
        other => Err(ConversionError::NotNumeric {
            value: other.to_string(),
        }),
    }
}

/// Convert a field value to an integer.
///
/// Floats are truncated toward zero (NaN and infinities are rejected);
/// strings must parse as an integer literal, so `"5.0"` is rejected.
pub fn to_i64(value: &Value) -> Result<i64, ConversionError> {
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Int64(i) => Ok(*i),
        Value::Float64(f) if f.is_finite() => Ok(f.trunc() as i64),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| ConversionError::NotIntegral {
            value: s.clone(),
        }),
        other => Err(ConversionError::NotIntegral {
            value: other.to_string(),
        }),
    }
}

/// Interpret a "discontinued" style flag.
///
/// Rules apply in order:
/// 1. empty or absent is `false`
/// 2. a number is `true` when nonzero (NaN counts as nonzero)
/// 3. the string `yes` in any case is `true`
/// 4. a string that parses as a float is `true` only when it is NaN
/// 5. anything else is `false`
///
/// Rule 4 means `"1"` is `false` while `"NaN"` is `true`. Existing data
/// depends on this ordering, so it is kept as is.
pub fn discontinued_flag(value: Option<&Value>) -> bool {
    let value = match value {
        None | Some(Value::Null) => return false,
        Some(v) => v,
    };

    match value {
        Value::Bool(b) => *b,
        Value::Int64(i) => *i != 0,
        Value::Float64(f) => *f != 0.0,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                false
            } else if trimmed.eq_ignore_ascii_case("yes") {
                true
            } else {
                trimmed.parse::<f64>().map(f64::is_nan).unwrap_or(false)
            }
        }
        Value::Null => false,
    }
}

/// Remove a single leading currency symbol
pub fn strip_currency(text: &str) -> &str {
    text.strip_prefix(CURRENCY_SYMBOL).unwrap_or(text)
}

/// Query side of an attribute lookup.
///
/// The query text loses one leading `$` and is compared with the stored
/// value's text after the same stripping. Stored numbers are the exception:
/// they compare numerically against the query when it parses, so `"$5.00"`
/// finds a stored `5.0`. Stored strings always compare as text, so `"7"`
/// does not find `"007"`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchKey {
    text: String,
    number: Option<f64>,
}

impl MatchKey {
    pub fn from_text(text: &str) -> Self {
        let stripped = strip_currency(text);
        Self {
            text: stripped.to_string(),
            number: stripped.parse::<f64>().ok(),
        }
    }

    /// Whether a stored cell matches. Absent and empty cells never do.
    pub fn matches(&self, stored: &Value) -> bool {
        match stored {
            Value::Null => false,
            Value::Int64(i) => self.matches_number(*i as f64, stored),
            Value::Float64(f) => self.matches_number(*f, stored),
            Value::String(s) => strip_currency(s) == self.text,
            Value::Bool(_) => stored.to_string() == self.text,
        }
    }

    fn matches_number(&self, n: f64, stored: &Value) -> bool {
        match self.number {
            Some(wanted) => wanted == n,
            None => stored.to_string() == self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(to_f64(&Value::Int64(3)).unwrap(), 3.0);
        assert_eq!(to_f64(&Value::String(" 2.5 ".into())).unwrap(), 2.5);
        assert!(matches!(
            to_f64(&Value::String("abc".into())),
            Err(ConversionError::NotNumeric { .. })
        ));
        assert!(to_f64(&Value::Null).is_err());

        assert_eq!(to_i64(&Value::Float64(7.9)).unwrap(), 7);
        assert_eq!(to_i64(&Value::String("12".into())).unwrap(), 12);
        assert!(to_i64(&Value::String("12.0".into())).is_err());
        assert!(to_i64(&Value::Float64(f64::NAN)).is_err());
    }

    // The ordering of the rules is unusual; these cases pin it down.
    #[test]
    fn test_discontinued_quirky_table() {
        assert!(!discontinued_flag(Some(&Value::String("".into()))));
        assert!(discontinued_flag(Some(&Value::Int64(1))));
        assert!(discontinued_flag(Some(&Value::String("yes".into()))));
        assert!(discontinued_flag(Some(&Value::String("NaN".into()))));
        assert!(!discontinued_flag(Some(&Value::String("no".into()))));
    }

    #[test]
    fn test_discontinued_edge_cases() {
        assert!(!discontinued_flag(None));
        assert!(!discontinued_flag(Some(&Value::Null)));
        assert!(!discontinued_flag(Some(&Value::String("   ".into()))));
        assert!(discontinued_flag(Some(&Value::String(" YES ".into()))));
        assert!(!discontinued_flag(Some(&Value::Int64(0))));
        assert!(discontinued_flag(Some(&Value::Float64(f64::NAN))));
        // numeric strings other than NaN are false
        assert!(!discontinued_flag(Some(&Value::String("1".into()))));
        assert!(discontinued_flag(Some(&Value::Bool(true))));
    }

    #[test]
    fn test_match_key_strips_one_currency_symbol() {
        let key = MatchKey::from_text("$5.00");
        assert!(key.matches(&Value::String("5.00".into())));
        assert!(key.matches(&Value::String("$5.00".into())));
        assert!(key.matches(&Value::Float64(5.0)));
        assert!(key.matches(&Value::Int64(5)));
        assert!(!key.matches(&Value::Null));

        assert!(MatchKey::from_text("$$5").matches(&Value::String("$5".into())));
        assert!(MatchKey::from_text("Widget").matches(&Value::String("Widget".into())));
    }

    #[test]
    fn test_match_key_compares_stored_strings_as_text() {
        assert!(!MatchKey::from_text("7").matches(&Value::String("007".into())));
        assert!(!MatchKey::from_text("$5").matches(&Value::String("5.00".into())));
        assert!(MatchKey::from_text("nan").matches(&Value::String("nan".into())));
        assert!(MatchKey::from_text("true").matches(&Value::Bool(true)));
    }

    #[test]
    fn test_bools_count_as_one_and_zero() {
        assert_eq!(to_f64(&Value::Bool(true)).unwrap(), 1.0);
        assert_eq!(to_f64(&Value::Bool(false)).unwrap(), 0.0);
        assert_eq!(to_i64(&Value::Bool(true)).unwrap(), 1);
    }
}
