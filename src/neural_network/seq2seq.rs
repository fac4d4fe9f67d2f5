use super::*;
use crate::dataset::{EOS_INDEX, SOS_INDEX};
use crate::error::IoError;
use crate::math::argmax;
use ndarray::{Array1, Array2, ArrayView1, ArrayViewD, ArrayViewMutD};
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand::rngs::StdRng;

/// Drives the LSTM cell one target token at a time and projects to vocabulary logits
pub mod decoder;
/// Runs the LSTM cell over a whole source sentence
pub mod encoder;
/// Gradient containers for the encoder, the decoder and the whole model
pub mod gradients;
/// The encoder/decoder pair and its parameter set
pub mod model;
/// JSON persistence of the ten named parameter tensors
pub mod serialize_weight;

pub use decoder::*;
pub use encoder::*;
pub use gradients::*;
pub use model::*;
pub use serialize_weight::*;

/// Persisted names of the parameter tensors, in the order the optimizer receives them
pub const PARAMETER_NAMES: [&str; 10] = [
    "enc_emb_w",
    "enc_lstm_wxh",
    "enc_lstm_whh",
    "enc_lstm_b",
    "dec_emb_w",
    "dec_lstm_wxh",
    "dec_lstm_whh",
    "dec_lstm_b",
    "dec_fc_w",
    "dec_fc_b",
];

/// Checks that an incoming `(dh, dc)` pair matches the hidden size before it is consumed
fn validate_state_gradient(grad: &LSTMState, units: usize) -> Result<(), ModelError> {
    if grad.h.len() != units || grad.c.len() != units {
        return Err(ModelError::InputValidationError(format!(
            "state gradient has lengths ({}, {}), expected ({}, {})",
            grad.h.len(),
            grad.c.len(),
            units,
            units
        )));
    }
    Ok(())
}
