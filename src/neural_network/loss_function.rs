/// Softmax cross entropy over vocabulary logits with an integer target
pub mod sparse_categorical_cross_entropy;

pub use sparse_categorical_cross_entropy::*;
