/// Module that contains the dense, embedding and LSTM cell layers
pub mod layer;
/// Module that contains the loss function used on decoder logits
pub mod loss_function;
/// Module that contains the clipped SGD optimizer
pub mod optimizer;
/// Module that contains the encoder, the decoder and the translator built from them
pub mod seq2seq;
/// Module that contains gradient computation and the training loop
pub mod trainer;

pub use layer::*;
pub use loss_function::*;
pub use optimizer::*;
pub use seq2seq::*;
pub use trainer::*;

use crate::ModelError;
