//! Validation helpers for DTOs.

use serde_json::Value;
use validator::ValidationError;

/// Coerces a loosely typed `seconds` field into a positive whole number of seconds.
///
/// Numbers and numeric strings are accepted; fractions are truncated toward zero.
///
/// # Examples
///
/// ```ignore
/// coerce_duration_seconds(&json!(300))     // Ok(300)
/// coerce_duration_seconds(&json!("90"))    // Ok(90)
/// coerce_duration_seconds(&json!(12.9))    // Ok(12)
/// coerce_duration_seconds(&json!(0))       // Err - not positive
/// coerce_duration_seconds(&json!("soon"))  // Err - not numeric
/// ```
pub fn coerce_duration_seconds(value: &Value) -> Result<u32, ValidationError> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    let Some(number) = number.filter(|n| n.is_finite()) else {
        let mut err = ValidationError::new("seconds_format");
        err.message = Some(format!("seconds must be a number (got {value})").into());
        return Err(err);
    };

    let whole = number.trunc();
    if whole < 1.0 || whole > f64::from(u32::MAX) {
        let mut err = ValidationError::new("seconds_range");
        err.message = Some(format!("seconds must be a positive integer (got {value})").into());
        return Err(err);
    }

    Ok(whole as u32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_coerce_duration_seconds_valid() {
        assert_eq!(coerce_duration_seconds(&json!(300)).unwrap(), 300);
        assert_eq!(coerce_duration_seconds(&json!("90")).unwrap(), 90);
        assert_eq!(coerce_duration_seconds(&json!(" 15 ")).unwrap(), 15);
        assert_eq!(coerce_duration_seconds(&json!(12.9)).unwrap(), 12);
        assert_eq!(coerce_duration_seconds(&json!(1)).unwrap(), 1);
    }

    #[test]
    fn test_coerce_duration_seconds_out_of_range() {
        assert!(coerce_duration_seconds(&json!(0)).is_err());
        assert!(coerce_duration_seconds(&json!(0.5)).is_err());
        assert!(coerce_duration_seconds(&json!(-10)).is_err());
        assert!(coerce_duration_seconds(&json!(1e12)).is_err());
    }

    #[test]
    fn test_coerce_duration_seconds_invalid_format() {
        assert!(coerce_duration_seconds(&json!("soon")).is_err());
        assert!(coerce_duration_seconds(&json!("")).is_err());
        assert!(coerce_duration_seconds(&json!(null)).is_err());
        assert!(coerce_duration_seconds(&json!(true)).is_err());
        assert!(coerce_duration_seconds(&json!([5])).is_err());
    }
}
