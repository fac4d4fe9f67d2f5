use super::*;

/// Validates that a dimension value is greater than 0
///
/// # Parameters
///
/// - `value` - The dimension value to validate
/// - `name` - The name of the dimension for error messages
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_dimension_greater_than_zero(
    value: usize,
    name: &str,
) -> Result<(), ModelError> {
    if value == 0 {
        return Err(ModelError::InputValidationError(format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(())
}

/// Validates that a vector has the length a layer expects
///
/// # Parameters
///
/// - `actual` - Length of the vector that was passed in
/// - `expected` - Length the layer was built for
/// - `name` - The name of the vector for error messages
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_vector_len(
    actual: usize,
    expected: usize,
    name: &str,
) -> Result<(), ModelError> {
    if actual != expected {
        return Err(ModelError::InputValidationError(format!(
            "{} has length {}, expected {}",
            name, actual, expected
        )));
    }
    Ok(())
}

/// Validates that a token index addresses an existing row of a table
pub(super) fn validate_index(index: usize, size: usize, name: &str) -> Result<(), ModelError> {
    if index >= size {
        return Err(ModelError::InputValidationError(format!(
            "{} {} is out of range for a table of {} rows",
            name, index, size
        )));
    }
    Ok(())
}
