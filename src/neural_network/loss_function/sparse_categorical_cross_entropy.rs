use crate::ModelError;
use crate::math::softmax;
use ndarray::{Array1, ArrayView1};

/// Offset added to the target probability before taking its logarithm
const LOG_EPSILON: f32 = 1e-9;

/// Sparse Categorical Cross Entropy on raw logits, for one decoder position
/// where the true label is an integer class index.
///
/// The logits are turned into probabilities with a max-shifted softmax, the loss is
/// `-ln(p[target] + 1e-9)`, and the gradient with respect to the logits is the
/// probability vector with 1 subtracted at the target index.
///
/// # Example
/// ```rust
/// use ndarray::array;
/// use rustynmt::neural_network::SparseCategoricalCrossEntropy;
///
/// let loss_fn = SparseCategoricalCrossEntropy::new();
/// let (loss, grad) = loss_fn.loss_and_grad(array![0.0, 0.0].view(), 1).unwrap();
/// assert!((loss - std::f32::consts::LN_2).abs() < 1e-5);
/// assert!((grad[1] + 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseCategoricalCrossEntropy;

impl SparseCategoricalCrossEntropy {
    /// Creates a new instance of SparseCategoricalCrossEntropy
    pub fn new() -> Self {
        Self {}
    }

    /// Computes the loss and its gradient with respect to `logits`.
    ///
    /// # Parameters
    ///
    /// - `logits` - Unnormalized scores over the vocabulary
    /// - `target` - Index of the true class
    ///
    /// # Returns
    ///
    /// - `Ok((loss, grad))` - Scalar loss and gradient vector with the shape of `logits`
    /// - `Err(ModelError::InputValidationError)` - If `target` is not a valid class index
    pub fn loss_and_grad(
        &self,
        logits: ArrayView1<f32>,
        target: usize,
    ) -> Result<(f32, Array1<f32>), ModelError> {
        if target >= logits.len() {
            return Err(ModelError::InputValidationError(format!(
                "target index {} is out of range for {} classes",
                target,
                logits.len()
            )));
        }

        let mut grad = softmax(&logits);
        let loss = -(grad[target] + LOG_EPSILON).ln();
        grad[target] -= 1.0;

        Ok((loss, grad))
    }
}
