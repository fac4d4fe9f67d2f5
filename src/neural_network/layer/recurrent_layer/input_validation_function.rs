use super::*;

/// Validates input and hidden dimensions for recurrent cells
///
/// # Parameters
///
/// - `input_dim` - The input dimension to validate
/// - `units` - The units dimension to validate
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_recurrent_dimensions(
    input_dim: usize,
    units: usize,
) -> Result<(), ModelError> {
    validate_dimension_greater_than_zero(input_dim, "input_dim")?;
    validate_dimension_greater_than_zero(units, "units")?;
    Ok(())
}

/// Validates that a state pair matches the number of units of a cell
///
/// # Parameters
///
/// - `h_len` - Length of the hidden-state vector (or its gradient)
/// - `c_len` - Length of the cell-state vector (or its gradient)
/// - `units` - Number of units of the cell
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_state_len(h_len: usize, c_len: usize, units: usize) -> Result<(), ModelError> {
    validate_vector_len(h_len, units, "hidden state")?;
    validate_vector_len(c_len, units, "cell state")?;
    Ok(())
}
