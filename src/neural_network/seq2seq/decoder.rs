use super::*;

/// What one decoder step saw: the input token, the cell's single step cache and the
/// hidden state that was fed to the projection.
#[derive(Debug, Clone)]
struct DecoderStepCache {
    token: usize,
    cell: LSTMStepCache,
    h_next: Array1<f32>,
}

/// Decoder half of the translator.
///
/// Runs one step at a time because each step's input token comes from the previous
/// step: the ground truth during training (teacher forcing) or the model's own
/// prediction when translating. A step is embed → LSTM step → dense projection to
/// vocabulary logits.
///
/// Every [`Decoder::forward`] call clears the cell's cache, runs exactly one cell step and
/// moves that step's cache onto the decoder's trajectory. [`Decoder::backward`] pops the
/// most recent entry, so backward calls replay the forward calls in exact reverse order
/// and each entry is consumed once.
#[derive(Debug, Clone)]
pub struct Decoder {
    pub(crate) embedding: Embedding,
    pub(crate) cell: LSTMCell,
    pub(crate) dense: Dense,
    steps: Vec<DecoderStepCache>,
}

impl Decoder {
    /// Creates a decoder whose projection outputs `vocab_size` logits.
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
        let dense = Dense::new(hidden_dim, vocab_size, rng)?;
        Ok(Self {
            embedding,
            cell,
            dense,
            steps: Vec::new(),
        })
    }

    /// Runs one decoding step.
    ///
    /// # Parameters
    ///
    /// - `token` - Input token for this step
    /// - `state` - State pair produced by the previous step (or by the encoder)
    ///
    /// # Returns
    ///
    /// - `Ok((logits, next_state))` - Vocabulary logits and the state for the next step
    /// - `Err(ModelError::InputValidationError)` - If `token` or `state` does not fit the decoder
    pub fn forward(
        &mut self,
        token: usize,
        state: &LSTMState,
    ) -> Result<(Array1<f32>, LSTMState), ModelError> {
        self.cell.reset_cache();

        let x = self.embedding.forward(token)?;
        let next = self.cell.step(x, state)?;
        let logits = self.dense.forward(next.h.view())?;

        let cell = self.cell.take_cache().pop().ok_or_else(|| {
            ModelError::ProcessingError("LSTM step did not record a cache entry".to_string())
        })?;
        self.steps.push(DecoderStepCache {
            token,
            cell,
            h_next: next.h.clone(),
        });

        Ok((logits, next))
    }

    /// Backpropagates through the most recent un-consumed step.
    ///
    /// The hidden state of a step feeds two consumers, the projection and the next
    /// recurrent step; their gradients are summed before entering the cell backward.
    ///
    /// # Parameters
    ///
    /// - `d_logits` - Gradient of the loss with respect to this step's logits
    /// - `grad_next` - `(dh, dc)` flowing back from the later step (zeros for the last step)
    ///
    /// # Returns
    ///
    /// - `Ok((gradients, grad_prev))` - This step's parameter gradients and the `(dh, dc)` for the previous step
    /// - `Err(ModelError::ProcessingError)` - If every forward step has already been consumed
    /// - `Err(ModelError::InputValidationError)` - If a gradient has the wrong size
    pub fn backward(
        &mut self,
        d_logits: ArrayView1<f32>,
        grad_next: &LSTMState,
    ) -> Result<(DecoderStepGradients, LSTMState), ModelError> {
        validate_state_gradient(grad_next, self.cell.units())?;
        if d_logits.len() != self.dense.output_dim() {
            return Err(ModelError::InputValidationError(format!(
                "logit gradient has length {}, expected {}",
                d_logits.len(),
                self.dense.output_dim()
            )));
        }

        let step = self.steps.pop().ok_or_else(|| {
            ModelError::ProcessingError(
                "Decoder backward called with no cached forward step".to_string(),
            )
        })?;

        let (dh_projection, dense) = self.dense.backward(step.h_next.view(), d_logits)?;
        let dh_total = dh_projection + &grad_next.h;

        let cell_grads = self
            .cell
            .step_backward(dh_total.view(), grad_next.c.view(), &step.cell)?;

        Ok((
            DecoderStepGradients {
                token: step.token,
                embedding_row: cell_grads.dx,
                cell: cell_grads.params,
                dense,
            },
            LSTMState {
                h: cell_grads.dh_prev,
                c: cell_grads.dc_prev,
            },
        ))
    }

    /// Discards every recorded step. Called at the start of each sequence.
    pub fn reset(&mut self) {
        self.cell.reset_cache();
        self.steps.clear();
    }

    /// Number of forward steps still waiting for their backward call.
    pub fn pending_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    pub fn cell(&self) -> &LSTMCell {
        &self.cell
    }

    pub fn dense(&self) -> &Dense {
        &self.dense
    }
}
