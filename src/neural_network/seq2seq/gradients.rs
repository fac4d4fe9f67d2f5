use super::*;

/// Parameter gradients produced by [`Encoder::backward`]
///
/// # Fields
///
/// - `embedding` - Gradient of the source embedding table, shape (vocab_size, embed_dim)
/// - `cell` - Gradients of the encoder cell, summed over all time steps
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderGradients {
    pub embedding: Array2<f32>,
    pub cell: LSTMCellGradients,
}

/// Gradients contributed by one [`Decoder::backward`] call.
///
/// The embedding gradient is kept as a single row for `token`; it is scattered into a
/// table-shaped gradient by [`DecoderGradients::accumulate`].
#[derive(Debug, Clone)]
pub struct DecoderStepGradients {
    pub token: usize,
    pub embedding_row: Array1<f32>,
    pub cell: LSTMCellGradients,
    pub dense: DenseGradients,
}

/// Decoder parameter gradients summed over every target position
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderGradients {
    pub embedding: Array2<f32>,
    pub cell: LSTMCellGradients,
    pub dense: DenseGradients,
}

impl DecoderGradients {
    /// All-zero gradients shaped like `decoder`'s parameters.
    pub fn zeros_like(decoder: &Decoder) -> Self {
        let embedding = decoder.embedding();
        let cell = decoder.cell();
        let dense = decoder.dense();
        Self {
            embedding: Array2::zeros((embedding.vocab_size(), embedding.embed_dim())),
            cell: LSTMCellGradients::zeros(cell.input_dim(), cell.units()),
            dense: DenseGradients::zeros(dense.input_dim(), dense.output_dim()),
        }
    }

    /// Adds one step's gradients. Steps that looked up the same token sum into the same row.
    pub fn accumulate(&mut self, step: &DecoderStepGradients) -> Result<(), ModelError> {
        Embedding::accumulate_grad(&mut self.embedding, step.token, step.embedding_row.view())?;
        self.cell.accumulate(&step.cell);
        self.dense.accumulate(&step.dense);
        Ok(())
    }
}

/// Gradients of the complete parameter set for one training example.
///
/// [`Seq2SeqGradients::tensors`] and [`Seq2SeqGradients::tensors_mut`] list the ten
/// tensors in [`PARAMETER_NAMES`] order, matching [`Seq2Seq::parameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct Seq2SeqGradients {
    pub encoder: EncoderGradients,
    pub decoder: DecoderGradients,
}

impl Seq2SeqGradients {
    /// Read-only views of the ten gradient tensors with their parameter names.
    pub fn tensors(&self) -> Vec<(&'static str, ArrayViewD<'_, f32>)> {
        let enc = &self.encoder;
        let dec = &self.decoder;
        let views = [
            enc.embedding.view().into_dyn(),
            enc.cell.kernel.view().into_dyn(),
            enc.cell.recurrent_kernel.view().into_dyn(),
            enc.cell.bias.view().into_dyn(),
            dec.embedding.view().into_dyn(),
            dec.cell.kernel.view().into_dyn(),
            dec.cell.recurrent_kernel.view().into_dyn(),
            dec.cell.bias.view().into_dyn(),
            dec.dense.weights.view().into_dyn(),
            dec.dense.bias.view().into_dyn(),
        ];
        PARAMETER_NAMES.into_iter().zip(views).collect()
    }

    /// Mutable views of the ten gradient tensors with their parameter names.
    pub fn tensors_mut(&mut self) -> Vec<(&'static str, ArrayViewMutD<'_, f32>)> {
        let enc = &mut self.encoder;
        let dec = &mut self.decoder;
        let views = [
            enc.embedding.view_mut().into_dyn(),
            enc.cell.kernel.view_mut().into_dyn(),
            enc.cell.recurrent_kernel.view_mut().into_dyn(),
            enc.cell.bias.view_mut().into_dyn(),
            dec.embedding.view_mut().into_dyn(),
            dec.cell.kernel.view_mut().into_dyn(),
            dec.cell.recurrent_kernel.view_mut().into_dyn(),
            dec.cell.bias.view_mut().into_dyn(),
            dec.dense.weights.view_mut().into_dyn(),
            dec.dense.bias.view_mut().into_dyn(),
        ];
        PARAMETER_NAMES.into_iter().zip(views).collect()
    }

    /// Sum of element-wise products with another gradient set of the same shapes.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any pair of tensors differs in shape
    pub fn dot(&self, other: &Seq2SeqGradients) -> Result<f32, ModelError> {
        let mut total = 0.0;
        for ((name, a), (_, b)) in self.tensors().into_iter().zip(other.tensors()) {
            if a.shape() != b.shape() {
                return Err(ModelError::InputValidationError(format!(
                    "gradient '{}' has shapes {:?} and {:?}",
                    name,
                    a.shape(),
                    b.shape()
                )));
            }
            total += a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f32>();
        }
        Ok(total)
    }
}
