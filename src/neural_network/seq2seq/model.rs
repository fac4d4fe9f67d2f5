use super::*;
use serde::{Deserialize, Serialize};

/// Dimensions of a [`Seq2Seq`] model
///
/// # Fields
///
/// - `input_vocab_size` - Number of source-language tokens, reserved tokens included
/// - `output_vocab_size` - Number of target-language tokens, reserved tokens included
/// - `embed_size` - Embedding width shared by both halves
/// - `hidden_size` - Hidden size `H` of both LSTM cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seq2SeqConfig {
    pub input_vocab_size: usize,
    pub output_vocab_size: usize,
    pub embed_size: usize,
    pub hidden_size: usize,
}

impl Seq2SeqConfig {
    /// Checks that every dimension is positive and the target vocabulary holds the reserved tokens.
    pub fn validate(&self) -> Result<(), ModelError> {
        let dims = [
            (self.input_vocab_size, "input_vocab_size"),
            (self.output_vocab_size, "output_vocab_size"),
            (self.embed_size, "embed_size"),
            (self.hidden_size, "hidden_size"),
        ];
        for (value, name) in dims {
            if value == 0 {
                return Err(ModelError::InputValidationError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }
        if self.output_vocab_size <= EOS_INDEX {
            return Err(ModelError::InputValidationError(format!(
                "output_vocab_size must be greater than {} to hold the start and end tokens, got {}",
                EOS_INDEX, self.output_vocab_size
            )));
        }
        Ok(())
    }
}

/// Encoder/decoder translator with hand-written backpropagation through time.
///
/// Owns the ten parameter tensors listed in [`PARAMETER_NAMES`]. Training goes through
/// [`crate::neural_network::trainer`]; this type exposes the parameters, greedy
/// translation and persistence.
///
/// # Example
/// ```rust
/// use rustynmt::neural_network::{Seq2Seq, Seq2SeqConfig};
///
/// let config = Seq2SeqConfig {
///     input_vocab_size: 12,
///     output_vocab_size: 10,
///     embed_size: 8,
///     hidden_size: 16,
/// };
/// let mut model = Seq2Seq::new(config, Some(42)).unwrap();
///
/// let output = model.translate(&[4, 5, 6], 5).unwrap();
/// assert!(output.len() <= 5);
/// assert_eq!(model.parameters().len(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct Seq2Seq {
    config: Seq2SeqConfig,
    pub(crate) encoder: Encoder,
    pub(crate) decoder: Decoder,
}

impl Seq2Seq {
    /// Builds a freshly initialized model.
    ///
    /// # Parameters
    ///
    /// - `config` - Model dimensions
    /// - `seed` - `Some(seed)` gives a fully reproducible initialization; `None` seeds from the OS
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `config` fails [`Seq2SeqConfig::validate`]
    pub fn new(config: Seq2SeqConfig, seed: Option<u64>) -> Result<Self, ModelError> {
        config.validate()?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let encoder = Encoder::new(
            config.input_vocab_size,
            config.embed_size,
            config.hidden_size,
            &mut rng,
        )?;
        let decoder = Decoder::new(
            config.output_vocab_size,
            config.embed_size,
            config.hidden_size,
            &mut rng,
        )?;

        Ok(Self {
            config,
            encoder,
            decoder,
        })
    }

    /// Named read-only views of the ten parameter tensors, in [`PARAMETER_NAMES`] order.
    pub fn parameters(&self) -> Vec<(&'static str, ArrayViewD<'_, f32>)> {
        let enc = &self.encoder;
        let dec = &self.decoder;
        let views = [
            enc.embedding.weights.view().into_dyn(),
            enc.cell.kernel.view().into_dyn(),
            enc.cell.recurrent_kernel.view().into_dyn(),
            enc.cell.bias.view().into_dyn(),
            dec.embedding.weights.view().into_dyn(),
            dec.cell.kernel.view().into_dyn(),
            dec.cell.recurrent_kernel.view().into_dyn(),
            dec.cell.bias.view().into_dyn(),
            dec.dense.weights.view().into_dyn(),
            dec.dense.bias.view().into_dyn(),
        ];
        PARAMETER_NAMES.into_iter().zip(views).collect()
    }

    /// Named mutable views of the ten parameter tensors, in [`PARAMETER_NAMES`] order.
    pub fn parameters_mut(&mut self) -> Vec<(&'static str, ArrayViewMutD<'_, f32>)> {
        let enc = &mut self.encoder;
        let dec = &mut self.decoder;
        let views = [
            enc.embedding.weights.view_mut().into_dyn(),
            enc.cell.kernel.view_mut().into_dyn(),
            enc.cell.recurrent_kernel.view_mut().into_dyn(),
            enc.cell.bias.view_mut().into_dyn(),
            dec.embedding.weights.view_mut().into_dyn(),
            dec.cell.kernel.view_mut().into_dyn(),
            dec.cell.recurrent_kernel.view_mut().into_dyn(),
            dec.cell.bias.view_mut().into_dyn(),
            dec.dense.weights.view_mut().into_dyn(),
            dec.dense.bias.view_mut().into_dyn(),
        ];
        PARAMETER_NAMES.into_iter().zip(views).collect()
    }

    /// Pairs each parameter with its gradient for [`Optimizer::step`].
    ///
    /// The optimizer clips the gradients in place, so `grads` is borrowed mutably.
    pub fn params_and_grads<'a>(
        &'a mut self,
        grads: &'a mut Seq2SeqGradients,
    ) -> Vec<ParamGrad<'a>> {
        self.parameters_mut()
            .into_iter()
            .zip(grads.tensors_mut())
            .map(|((name, value), (_, grad))| ParamGrad { name, value, grad })
            .collect()
    }

    /// All-zero gradients shaped like this model's parameters.
    pub fn zero_gradients(&self) -> Seq2SeqGradients {
        let embedding = self.encoder.embedding();
        let cell = self.encoder.cell();
        Seq2SeqGradients {
            encoder: EncoderGradients {
                embedding: Array2::zeros((embedding.vocab_size(), embedding.embed_dim())),
                cell: LSTMCellGradients::zeros(cell.input_dim(), cell.units()),
            },
            decoder: DecoderGradients::zeros_like(&self.decoder),
        }
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.parameters().iter().map(|(_, p)| p.len()).sum()
    }

    /// Teacher-forced forward pass without recording anything for backpropagation.
    ///
    /// Feeds `<SOS>` followed by `target[..len-1]` and returns one logit vector per
    /// target position. Both halves are reset afterwards.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a token index is out of range
    pub fn teacher_forced_logits(
        &mut self,
        input: &[usize],
        target: &[usize],
    ) -> Result<Vec<Array1<f32>>, ModelError> {
        let result = self.run_teacher_forced(input, target);
        self.encoder.reset();
        self.decoder.reset();
        result
    }

    fn run_teacher_forced(
        &mut self,
        input: &[usize],
        target: &[usize],
    ) -> Result<Vec<Array1<f32>>, ModelError> {
        self.decoder.reset();
        let mut state = self.encoder.forward(input)?;
        let mut token = SOS_INDEX;
        let mut outputs = Vec::with_capacity(target.len());
        for &next in target {
            let (logits, next_state) = self.decoder.forward(token, &state)?;
            outputs.push(logits);
            state = next_state;
            token = next;
        }
        Ok(outputs)
    }

    /// Greedy decoding of one source sequence.
    ///
    /// Starts from `<SOS>` and feeds back the argmax token until `<EOS>` is produced or
    /// `max_length` tokens have been emitted. `<EOS>` itself is not part of the output.
    ///
    /// # Parameters
    ///
    /// - `input` - Source token indices
    /// - `max_length` - Upper bound on the number of emitted tokens
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<usize>)` - Predicted target token indices
    /// - `Err(ModelError::InputValidationError)` - If a source index is out of range
    pub fn translate(
        &mut self,
        input: &[usize],
        max_length: usize,
    ) -> Result<Vec<usize>, ModelError> {
        let result = self.run_greedy(input, max_length);
        self.encoder.reset();
        self.decoder.reset();
        result
    }

    fn run_greedy(&mut self, input: &[usize], max_length: usize) -> Result<Vec<usize>, ModelError> {
        self.decoder.reset();
        let mut state = self.encoder.forward(input)?;
        let mut token = SOS_INDEX;
        let mut output = Vec::with_capacity(max_length);
        while output.len() < max_length {
            let (logits, next_state) = self.decoder.forward(token, &state)?;
            let predicted = argmax(&logits).ok_or_else(|| {
                ModelError::ProcessingError("decoder produced empty logits".to_string())
            })?;
            if predicted == EOS_INDEX {
                break;
            }
            output.push(predicted);
            state = next_state;
            token = predicted;
        }
        Ok(output)
    }

    pub fn config(&self) -> &Seq2SeqConfig {
        &self.config
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }
}
