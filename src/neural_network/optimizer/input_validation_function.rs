use super::*;

/// Validates that the learning rate is positive and finite.
///
/// # Parameters
///
/// * `learning_rate` - The learning rate value to validate
///
/// # Returns
///
/// - `Ok(())` if the learning rate is positive and finite
/// - `Err(ModelError::InputValidationError)` if the learning rate is not positive or not finite
pub(super) fn validate_learning_rate(learning_rate: f32) -> Result<(), ModelError> {
    validate_positive_finite(learning_rate, "learning_rate")
}

/// Validates that a value is positive and finite.
///
/// # Parameters
///
/// - `value` - The value to validate
/// - `param_name` - The name of the parameter (for error messages)
///
/// # Returns
///
/// - `Ok(())` if the value is positive and finite
/// - `Err(ModelError::InputValidationError)` if the value is not positive or not finite
pub(super) fn validate_positive_finite(value: f32, param_name: &str) -> Result<(), ModelError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "{} must be positive and finite, got {}",
            param_name, value
        )));
    }
    Ok(())
}

/// Validates that every parameter has the same shape as its gradient.
///
/// Runs before any tensor is touched so a bad pair cannot leave the model half updated.
pub(super) fn validate_param_shapes(params: &[ParamGrad<'_>]) -> Result<(), ModelError> {
    for p in params {
        if p.value.shape() != p.grad.shape() {
            return Err(ModelError::InputValidationError(format!(
                "gradient for '{}' has shape {:?}, parameter has shape {:?}",
                p.name,
                p.grad.shape(),
                p.value.shape()
            )));
        }
    }
    Ok(())
}
