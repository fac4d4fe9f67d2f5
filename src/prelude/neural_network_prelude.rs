pub use crate::neural_network::layer::recurrent_layer::*;
pub use crate::neural_network::layer::{Dense, DenseGradients, Embedding};
pub use crate::neural_network::loss_function::*;
pub use crate::neural_network::optimizer::*;
pub use crate::neural_network::seq2seq::{Decoder, Encoder, Seq2Seq, Seq2SeqConfig};
pub use crate::neural_network::seq2seq::{Seq2SeqGradients, PARAMETER_NAMES};
pub use crate::neural_network::trainer::*;
