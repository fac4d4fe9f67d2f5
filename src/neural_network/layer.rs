use super::*;
use crate::math::{outer, sigmoid_vec, tanh_vec};
use input_validation_function::*;
use ndarray::{Array, Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{StandardNormal, Uniform};

/// Fully connected projection `y = xW + b`
pub mod dense;
/// Trainable token embedding table
pub mod embedding;
/// Input validation functions shared by all layers
mod input_validation_function;
/// Recurrent cells driven one time step at a time
pub mod recurrent_layer;

pub use dense::*;
pub use embedding::*;
pub use recurrent_layer::*;
