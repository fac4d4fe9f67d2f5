use super::*;

/// Encoder half of the translator: embeds each source token and runs the LSTM cell
/// over the whole sequence from the zero state.
///
/// [`Encoder::forward`] records one step cache per token. [`Encoder::backward`] consumes
/// that trajectory, last step first, and can run only once per forward pass.
///
/// # Fields
///
/// - `embedding` - Source-language embedding table
/// - `cell` - Recurrent cell shared by every time step
/// - `tokens` - Token indices of the pending forward pass, `None` when there is nothing to backpropagate
#[derive(Debug, Clone)]
pub struct Encoder {
    pub(crate) embedding: Embedding,
    pub(crate) cell: LSTMCell,
    tokens: Option<Vec<usize>>,
}

impl Encoder {
    /// Creates an encoder.
    ///
    /// # Parameters
    ///
    /// - `vocab_size` - Number of source-language tokens
    /// - `embed_dim` - Size of each embedding row (the cell's input size)
    /// - `hidden_dim` - Hidden size `H` of the cell
    /// - `rng` - Random source for initialization
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any dimension is 0
    pub fn new<R: Rng + ?Sized>(
        vocab_size: usize,
        embed_dim: usize,
        hidden_dim: usize,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        let embedding = Embedding::new(vocab_size, embed_dim, rng)?;
        let cell = LSTMCell::new(embed_dim, hidden_dim, rng)?;
        Ok(Self {
            embedding,
            cell,
            tokens: None,
        })
    }

    /// Encodes `sequence` and returns the final `(h, c)` pair.
    ///
    /// Clears any previous trajectory first. An empty sequence yields the zero state.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a token index is outside the embedding table
    pub fn forward(&mut self, sequence: &[usize]) -> Result<LSTMState, ModelError> {
        self.reset();

        let mut state = LSTMState::zeros(self.cell.units());
        for &token in sequence {
            let x = self.embedding.forward(token)?;
            state = self.cell.step(x, &state)?;
        }

        self.tokens = Some(sequence.to_vec());
        Ok(state)
    }

    /// Backpropagates through every cached step, from the last token to the first.
    ///
    /// # Parameters
    ///
    /// - `grad` - Gradient `(dh, dc)` with respect to the final state returned by [`Encoder::forward`]
    ///
    /// # Returns
    ///
    /// - `Ok(EncoderGradients)` - Summed cell gradients and the embedding gradient
    /// - `Err(ModelError::ProcessingError)` - If there is no forward pass to consume
    /// - `Err(ModelError::InputValidationError)` - If `grad` has the wrong size
    pub fn backward(&mut self, grad: LSTMState) -> Result<EncoderGradients, ModelError> {
        validate_state_gradient(&grad, self.cell.units())?;

        let tokens = self.tokens.take().ok_or_else(|| {
            ModelError::ProcessingError(
                "Encoder backward called without a matching forward pass".to_string(),
            )
        })?;
        let steps = self.cell.take_cache();
        if steps.len() != tokens.len() {
            return Err(ModelError::ProcessingError(format!(
                "Encoder cache holds {} steps for a sequence of {} tokens",
                steps.len(),
                tokens.len()
            )));
        }

        let mut cell_grads = LSTMCellGradients::zeros(self.cell.input_dim(), self.cell.units());
        let mut dx_rows = Array2::<f32>::zeros((steps.len(), self.embedding.embed_dim()));

        let LSTMState { h: mut dh, c: mut dc } = grad;
        for (t, step) in steps.iter().enumerate().rev() {
            let step_grads = self.cell.step_backward(dh.view(), dc.view(), step)?;
            cell_grads.accumulate(&step_grads.params);
            dx_rows.row_mut(t).assign(&step_grads.dx);
            dh = step_grads.dh_prev;
            dc = step_grads.dc_prev;
        }

        let embedding = self.embedding.backward(&tokens, dx_rows.view())?;

        Ok(EncoderGradients {
            embedding,
            cell: cell_grads,
        })
    }

    /// Discards any recorded trajectory.
    pub fn reset(&mut self) {
        self.cell.reset_cache();
        self.tokens = None;
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    pub fn cell(&self) -> &LSTMCell {
        &self.cell
    }
}
