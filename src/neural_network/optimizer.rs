use crate::ModelError;
use input_validation_function::*;
use ndarray::ArrayViewMutD;
use rayon::prelude::*;

/// Input validation functions for optimizer hyperparameters
mod input_validation_function;
/// Stochastic Gradient Descent with element-wise gradient clipping
pub mod sgd;

pub use crate::traits::Optimizer;
pub use sgd::*;

/// One trainable tensor paired with its gradient, handed to an [`Optimizer`].
///
/// The optimizer only ever sees these pairs, never the model that owns them.
///
/// # Fields
///
/// - `name` - Stable name of the tensor (the same key used when saving weights)
/// - `value` - Mutable view of the parameter, updated in place
/// - `grad` - Mutable view of the gradient; optimizers may clip it in place
#[derive(Debug)]
pub struct ParamGrad<'a> {
    pub name: &'static str,
    pub value: ArrayViewMutD<'a, f32>,
    pub grad: ArrayViewMutD<'a, f32>,
}
