//! Field checks shared by the entity helpers.

use crate::errors::ModelError;

pub fn require_text(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: f64) -> Result<(), ModelError> {
    if !(value > 0.0) {
        return Err(ModelError::Validation(format!("{field} must be greater than 0")));
    }
    Ok(())
}

pub fn require_positive_opt(field: &str, value: Option<f64>) -> Result<(), ModelError> {
    match value {
        Some(v) => require_positive(field, v),
        None => Ok(()),
    }
}

pub fn require_staff_count(value: i32) -> Result<(), ModelError> {
    if value < 1 {
        return Err(ModelError::Validation("minimum_staff_count must be at least 1".into()));
    }
    Ok(())
}

pub fn require_tool_quantity(value: i32) -> Result<(), ModelError> {
    if value < 1 {
        return Err(ModelError::Validation("quantity_required must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("task_name", "  ").is_err());
        assert!(require_text("task_name", "Oil change").is_ok());
    }

    #[test]
    fn quantities_must_be_positive() {
        assert!(require_positive("quantity_required", 0.0).is_err());
        assert!(require_positive("quantity_required", f64::NAN).is_err());
        assert!(require_positive("quantity_required", 0.5).is_ok());
        assert!(require_positive_opt("delta_m1", None).is_ok());
        assert!(require_positive_opt("delta_m1", Some(-2.0)).is_err());
        assert!(require_staff_count(0).is_err());
        assert!(require_tool_quantity(1).is_ok());
    }
}
