//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects values that are empty once surrounding whitespace is removed.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Ann")   // Ok
/// validate_not_blank("   ")   // Err
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Reads a JSON number as a non-negative score, dropping any fractional part.
///
/// Returns `None` for non-numbers, negative numbers and values beyond the score range.
pub fn floor_score(value: &serde_json::Value) -> Option<u32> {
    let score = value.as_f64()?;
    if !score.is_finite() || score < 0.0 || score > f64::from(u32::MAX) {
        return None;
    }
    Some(score.floor() as u32)
}
