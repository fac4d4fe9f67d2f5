/// Prelude module for vocabulary and corpus handling.
pub mod dataset_prelude;
/// Prelude module for mathematical operations.
pub mod math_prelude;
/// Prelude module for the translator, its layers and its training loop.
pub mod neural_network_prelude;

pub use crate::error::{IoError, ModelError};
pub use dataset_prelude::*;
pub use math_prelude::*;
pub use neural_network_prelude::*;
