use super::*;
use ndarray::Zip;

/// Default bound for element-wise gradient clipping
pub const DEFAULT_CLIP_VALUE: f32 = 5.0;

/// Stochastic Gradient Descent (SGD) optimizer with per-tensor, element-wise gradient clipping.
///
/// Each step first clamps every element of every gradient tensor into
/// `[-clip_value, clip_value]` (in place), then applies `param -= learning_rate * grad`.
/// Clipping bounds each tensor independently; it is not a global-norm rescale.
///
/// The optimizer holds no state besides its two hyperparameters.
///
/// # Fields
///
/// - `learning_rate` - Learning rate controlling the size of parameter updates
/// - `clip_value` - Symmetric bound applied to every gradient element
///
/// # Example
/// ```rust
/// use ndarray::array;
/// use rustynmt::neural_network::{Optimizer, ParamGrad, SGD};
///
/// let mut weights = array![1.0_f32, 1.0, 1.0].into_dyn();
/// let mut grad = array![10.0_f32, -0.5, -7.0].into_dyn();
///
/// let mut sgd = SGD::new(0.1).unwrap();
/// sgd.step(vec![ParamGrad {
///     name: "w",
///     value: weights.view_mut(),
///     grad: grad.view_mut(),
/// }])
/// .unwrap();
///
/// assert_eq!(grad.as_slice().unwrap(), &[5.0, -0.5, -5.0]);
/// let w = weights.as_slice().unwrap();
/// assert!((w[0] - 0.5).abs() < 1e-6);
/// assert!((w[1] - 1.05).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SGD {
    learning_rate: f32,
    clip_value: f32,
}

impl SGD {
    /// Creates a new SGD optimizer clipping at [`DEFAULT_CLIP_VALUE`].
    ///
    /// # Parameters
    ///
    /// * `learning_rate` - Step size for parameter updates
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new SGD optimizer instance
    /// - `Err(ModelError::InputValidationError)` - If `learning_rate` is not positive and finite
    pub fn new(learning_rate: f32) -> Result<Self, ModelError> {
        Self::with_clip_value(learning_rate, DEFAULT_CLIP_VALUE)
    }

    /// Creates a new SGD optimizer with an explicit clipping bound.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If either value is not positive and finite
    pub fn with_clip_value(learning_rate: f32, clip_value: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        validate_positive_finite(clip_value, "clip_value")?;
        Ok(Self {
            learning_rate,
            clip_value,
        })
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn clip_value(&self) -> f32 {
        self.clip_value
    }

    /// Clamps every element of `grad` into `[-clip_value, clip_value]` in place.
    pub fn clip_gradient(grad: &mut ArrayViewMutD<'_, f32>, clip_value: f32) {
        grad.par_mapv_inplace(|g| g.clamp(-clip_value, clip_value));
    }

    /// Applies `value -= lr * grad` element-wise.
    pub fn update_sgd_parameters(
        value: &mut ArrayViewMutD<'_, f32>,
        grad: &ArrayViewMutD<'_, f32>,
        lr: f32,
    ) {
        Zip::from(value).and(grad).par_for_each(|w, &g| {
            *w -= g * lr;
        });
    }
}

impl Optimizer for SGD {
    fn step(&mut self, mut params: Vec<ParamGrad<'_>>) -> Result<(), ModelError> {
        validate_param_shapes(&params)?;

        params.par_iter_mut().for_each(|p| {
            Self::clip_gradient(&mut p.grad, self.clip_value);
            Self::update_sgd_parameters(&mut p.value, &p.grad, self.learning_rate);
        });

        Ok(())
    }
}
