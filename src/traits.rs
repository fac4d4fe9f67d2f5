use crate::ModelError;
use crate::neural_network::ParamGrad;

/// Defines the interface for optimization algorithms.
///
/// An optimizer receives explicit `(parameter, gradient)` pairs and updates each
/// parameter in place. It never reaches into the structure of the model.
pub trait Optimizer {
    /// Applies one update to every parameter in `params`.
    ///
    /// # Parameters
    ///
    /// * `params` - Parameter/gradient pairs produced for a single training example
    ///
    /// # Returns
    ///
    /// - `Ok(())` - All parameters were updated
    /// - `Err(ModelError)` - Nothing was updated because a pair was malformed
    fn step(&mut self, params: Vec<ParamGrad<'_>>) -> Result<(), ModelError>;
}
