pub use crate::math::{sigmoid, sigmoid_vec, tanh_vec};
pub use crate::math::{argmax, outer, softmax};
