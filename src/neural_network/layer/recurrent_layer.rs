use super::*;
use input_validation_function::*;

/// Input validation functions for recurrent cells
mod input_validation_function;
/// A LSTM (Long Short-Term Memory) cell driven one time step at a time
pub mod lstm_cell;

pub use lstm_cell::*;
